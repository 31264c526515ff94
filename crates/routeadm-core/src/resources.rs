//! Standard services for the console's resources

use std::sync::Arc;

use routeadm_api::models::{Egress, Route};
use routeadm_api::requests::{PAGE, PAGE_SIZE, SEARCH};
use routeadm_api::{QueryParams, ResourceId, StandardResult};
use routeadm_client::{EgressFilter, EgressPage, EgressService, HttpClient, RestResource};

use crate::adapter::{AdapterBuilder, ServiceAdapter};
use crate::error::AdapterError;

/// Routes follow the REST conventions, batch delete included
#[must_use]
pub fn routes(client: HttpClient) -> RestResource<Route> {
    RestResource::new(client, "routes")
}

/// Adapt the egress service onto the standard verbs
///
/// The list call is translated to `pageNo`/`size`/`keyword` and its
/// `{ items, total }` page is unwrapped. Egress has no batch endpoint.
///
/// # Errors
/// Never fails in practice; the error is the builder's.
pub fn egress(service: EgressService) -> Result<ServiceAdapter<Egress>, AdapterError> {
    AdapterBuilder::new(Arc::new(service))
        .get_list_with(
            |svc: Arc<EgressService>, filter: EgressFilter| async move {
                svc.get_egress_list(&filter).await
            },
            egress_filter,
            egress_page,
        )
        .create(|svc: Arc<EgressService>, egress: Egress| async move {
            svc.create_egress(&egress).await
        })
        .update(
            |svc: Arc<EgressService>, (id, egress): (ResourceId, Egress)| async move {
                svc.update_egress(&id, &egress).await
            },
        )
        .delete(|svc: Arc<EgressService>, id: ResourceId| async move {
            svc.remove_egress(&id).await
        })
        .build()
}

/// Translate standard params into the egress list filter
///
/// Filters without a dedicated field are passed through under their own key.
#[must_use]
pub fn egress_filter(mut params: QueryParams) -> EgressFilter {
    let defaults = EgressFilter::default();
    let page_no = params.page().unwrap_or(defaults.page_no);
    let size = params.page_size().unwrap_or(defaults.size);
    let keyword = params.search().map(str::to_string);
    for key in [PAGE, PAGE_SIZE, SEARCH] {
        params.remove(key);
    }
    let protocol = params
        .remove("protocol")
        .and_then(|v| v.as_str().map(str::to_string));
    let enabled = params.remove("enabled").and_then(|v| v.as_bool());

    if !params.is_empty() {
        let keys: Vec<&str> = params.iter().map(|(key, _)| key).collect();
        tracing::debug!(?keys, "passing extra egress filters through");
    }

    EgressFilter {
        page_no,
        size,
        keyword,
        protocol,
        enabled,
        extra: params,
    }
}

fn egress_page(result: StandardResult<EgressPage>) -> StandardResult<Vec<Egress>> {
    let total = result.data.as_ref().map(|page| page.total);
    let result = result.map(|page| page.items);
    match total {
        Some(total) if result.total.is_none() => result.with_total(total),
        _ => result,
    }
}
