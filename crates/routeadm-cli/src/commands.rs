//! Subcommand arguments and handlers

use std::sync::Arc;

use clap::{Args, Subcommand};
use routeadm_api::models::{Egress, Route};
use routeadm_api::{QueryParams, ResourceId};
use routeadm_core::{Collection, CollectionOptions, StandardService};
use serde_json::Value;

use crate::output::{PrintNotifier, Row, print_batch, print_page};

/// Options shared by list commands
#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: u64,

    /// Records per page (defaults to the configured page size)
    #[arg(long)]
    pub page_size: Option<u64>,

    /// Free-text search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Extra filter as key=value (repeatable)
    #[arg(short, long = "filter", value_parser = parse_filter)]
    pub filters: Vec<Filter>,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl ListArgs {
    fn params(&self) -> QueryParams {
        let mut params: QueryParams = self
            .filters
            .iter()
            .map(|f| (f.key.clone(), f.value.clone()))
            .collect();
        if let Some(search) = &self.search {
            params.insert("search", search.clone());
        }
        params
    }
}

/// Resource-specific list filter
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub key: String,
    pub value: Value,
}

/// Parse `key=value`, reading the value as JSON when possible
fn parse_filter(raw: &str) -> Result<Filter, String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    if key.is_empty() {
        return Err("filter key must not be empty".to_string());
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::from(value));
    Ok(Filter {
        key: key.to_string(),
        value,
    })
}

#[derive(Subcommand, Debug)]
pub enum EgressCommand {
    /// List egress rules
    List(ListArgs),
    /// Create an egress rule
    Create(EgressArgs),
    /// Update an egress rule
    Update {
        id: ResourceId,
        #[command(flatten)]
        egress: EgressArgs,
    },
    /// Delete an egress rule
    Delete { id: ResourceId },
    /// Delete several egress rules
    BatchDelete {
        #[arg(required = true)]
        ids: Vec<ResourceId>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct EgressArgs {
    #[arg(long)]
    pub name: String,
    /// Upstream address, host:port
    #[arg(long)]
    pub address: String,
    #[arg(long, default_value = "socks5")]
    pub protocol: String,
    #[arg(long)]
    pub remark: Option<String>,
    /// Create the rule disabled
    #[arg(long)]
    pub disabled: bool,
}

impl From<EgressArgs> for Egress {
    fn from(args: EgressArgs) -> Self {
        let mut egress = Egress::new(args.name, args.address).with_protocol(args.protocol);
        egress.remark = args.remark;
        egress.enabled = !args.disabled;
        egress
    }
}

#[derive(Subcommand, Debug)]
pub enum RouteCommand {
    /// List routes
    List(ListArgs),
    /// Create a route
    Create(RouteArgs),
    /// Update a route
    Update {
        id: ResourceId,
        #[command(flatten)]
        route: RouteArgs,
    },
    /// Delete a route
    Delete { id: ResourceId },
    /// Delete several routes
    BatchDelete {
        #[arg(required = true)]
        ids: Vec<ResourceId>,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RouteArgs {
    /// Domain pattern, e.g. *.example.com
    #[arg(long)]
    pub pattern: String,
    /// Egress rule name
    #[arg(long)]
    pub egress: String,
    #[arg(long, default_value = "0")]
    pub priority: i32,
    /// Create the route disabled
    #[arg(long)]
    pub disabled: bool,
}

impl From<RouteArgs> for Route {
    fn from(args: RouteArgs) -> Self {
        let mut route = Route::new(args.pattern, args.egress).with_priority(args.priority);
        route.enabled = !args.disabled;
        route
    }
}

/// One resource-level action, independent of the record type
pub enum Action<T> {
    List(ListArgs),
    Create(T),
    Update(ResourceId, T),
    Delete(ResourceId),
    BatchDelete(Vec<ResourceId>),
}

impl From<EgressCommand> for Action<Egress> {
    fn from(command: EgressCommand) -> Self {
        match command {
            EgressCommand::List(args) => Self::List(args),
            EgressCommand::Create(args) => Self::Create(args.into()),
            EgressCommand::Update { id, egress } => Self::Update(id, egress.into()),
            EgressCommand::Delete { id } => Self::Delete(id),
            EgressCommand::BatchDelete { ids } => Self::BatchDelete(ids),
        }
    }
}

impl From<RouteCommand> for Action<Route> {
    fn from(command: RouteCommand) -> Self {
        match command {
            RouteCommand::List(args) => Self::List(args),
            RouteCommand::Create(args) => Self::Create(args.into()),
            RouteCommand::Update { id, route } => Self::Update(id, route.into()),
            RouteCommand::Delete { id } => Self::Delete(id),
            RouteCommand::BatchDelete { ids } => Self::BatchDelete(ids),
        }
    }
}

/// Run an action through a collection
///
/// Mutations reload the first page afterwards, which is printed. Returns
/// whether the action succeeded.
pub async fn run<T>(
    service: Arc<dyn StandardService<T>>,
    label: &str,
    page_size: u64,
    action: Action<T>,
) -> eyre::Result<bool>
where
    T: Row + Clone + Send + Sync + 'static,
{
    let options = CollectionOptions::labeled(label)
        .with_immediate(false)
        .with_page_size(page_size);
    let collection = Collection::new(service, Arc::new(PrintNotifier), options);

    let success = match action {
        Action::List(args) => {
            collection
                .reload_with(
                    Some(args.page),
                    Some(args.page_size.unwrap_or(page_size)),
                    Some(args.params()),
                )
                .await;
            let state = collection.snapshot();
            if state.error.is_none() {
                print_page(&state, args.json)?;
            }
            return Ok(state.error.is_none());
        }
        Action::Create(record) => collection.create(record).await.success,
        Action::Update(id, record) => collection.update(id, record).await.success,
        Action::Delete(id) => collection.delete(id).await.success,
        Action::BatchDelete(ids) => {
            let result = collection.batch_delete(ids).await;
            print_batch(&result);
            result.success
        }
    };

    let state = collection.snapshot();
    if success && state.error.is_none() {
        print_page(&state, false)?;
    }
    Ok(success)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_filter() {
        assert_eq!(
            parse_filter("enabled=true").unwrap(),
            Filter {
                key: "enabled".to_string(),
                value: Value::Bool(true),
            }
        );
        assert_eq!(
            parse_filter("region=eu-west").unwrap().value,
            Value::from("eu-west")
        );
        assert!(parse_filter("nokey").is_err());
        assert!(parse_filter("=1").is_err());
    }

    #[test]
    fn test_list_params() {
        let args = ListArgs {
            page: 1,
            page_size: None,
            search: Some("hk".into()),
            filters: vec![Filter {
                key: "protocol".into(),
                value: Value::from("http"),
            }],
            json: false,
        };
        let params = args.params();
        assert_eq!(params.search(), Some("hk"));
        assert_eq!(params.get("protocol"), Some(&Value::from("http")));
    }

    #[test]
    fn test_route_args_into_route() {
        let route: Route = RouteArgs {
            pattern: "*.a.example".into(),
            egress: "hk-1".into(),
            priority: 3,
            disabled: true,
        }
        .into();
        assert_eq!(route.priority, 3);
        assert!(!route.enabled);
    }
}
