//! Search request payload.
//!
//! One request body per result page; only `currentPage` changes between
//! pages.

use pricefeed_core::config::{MapBounds, SourceConfig};
use serde::Serialize;

/// Body of a search request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub search_query_state: SearchQueryState,
    pub wants: Wants,
    pub request_id: u32,
    pub is_debug_request: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQueryState {
    pub pagination: Pagination,
    pub is_map_visible: bool,
    pub map_bounds: MapBounds,
    pub region_selection: Vec<RegionSelection>,
    pub filter_state: FilterState,
    pub is_list_visible: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionSelection {
    pub region_id: u32,
    pub region_type: u32,
}

/// A `{"value": ...}` wrapper used by every filter field.
#[derive(Debug, Clone, Serialize)]
pub struct FilterValue<T> {
    pub value: T,
}

impl<T> From<T> for FilterValue<T> {
    fn from(value: T) -> Self {
        Self { value }
    }
}

/// Restricts results to recently sold homes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub sort_selection: FilterValue<String>,
    pub is_for_sale_by_agent: FilterValue<bool>,
    pub is_for_sale_by_owner: FilterValue<bool>,
    pub is_new_construction: FilterValue<bool>,
    pub is_coming_soon: FilterValue<bool>,
    pub is_auction: FilterValue<bool>,
    pub is_for_sale_foreclosure: FilterValue<bool>,
    pub is_recently_sold: FilterValue<bool>,
    pub doz: FilterValue<String>,
}

impl FilterState {
    /// Recently sold homes within the given days-on-site window.
    pub fn recently_sold(days_on_site: &str) -> Self {
        Self {
            sort_selection: "globalrelevanceex".to_string().into(),
            is_for_sale_by_agent: false.into(),
            is_for_sale_by_owner: false.into(),
            is_new_construction: false.into(),
            is_coming_soon: false.into(),
            is_auction: false.into(),
            is_for_sale_foreclosure: false.into(),
            is_recently_sold: true.into(),
            doz: days_on_site.to_string().into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Wants {
    pub cat1: Vec<String>,
}

impl SearchRequest {
    /// Request for one page of results (pages start at 1).
    pub fn for_page(config: &SourceConfig, page: u32) -> Self {
        Self {
            search_query_state: SearchQueryState {
                pagination: Pagination { current_page: page },
                is_map_visible: false,
                map_bounds: config.map_bounds,
                region_selection: vec![RegionSelection {
                    region_id: config.region_id,
                    region_type: config.region_type,
                }],
                filter_state: FilterState::recently_sold(&config.days_on_site),
                is_list_visible: true,
            },
            wants: Wants {
                cat1: vec!["listResults".to_string()],
            },
            request_id: 2,
            is_debug_request: false,
        }
    }
}
