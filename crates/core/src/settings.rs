//! Browsing settings for the workspace listing and the paging derived
//! from the last fetch.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;

/// Default page size of the listing.
pub const DEFAULT_LIMIT: u64 = 30;

/// Default sort column.
pub const DEFAULT_SORT: &str = "label_Live";

/// Language filter value meaning "every language".
pub const ALL_LANGUAGES: &str = "all";

/// Sort direction as sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "ASC")]
    Ascending,
    #[serde(rename = "DESC")]
    Descending,
}

/// Workspace browsing context, serialized verbatim as the
/// `getWorkspaceInfos` argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Settings {
    /// Workspace id.
    pub id: i64,
    /// Page-tree depth filter.
    pub depth: i64,
    pub language: String,
    /// Stage filter; `None` until the host supplies a selection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    pub sort: String,
    pub dir: SortDirection,
    pub query: String,
    #[serde(rename = "filterTxt")]
    pub filter_txt: String,
    pub start: u64,
    #[validate(range(min = 1, message = "limit must be at least 1"))]
    pub limit: u64,
}

impl Settings {
    pub fn new(workspace_id: i64) -> Self {
        Self {
            id: workspace_id,
            depth: 1,
            language: ALL_LANGUAGES.to_string(),
            stage: None,
            sort: DEFAULT_SORT.to_string(),
            dir: SortDirection::Ascending,
            query: String::new(),
            filter_txt: String::new(),
            start: 0,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Builder-style page size override.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = limit;
        self
    }

    /// Validate the settings before they are sent.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()
            .map_err(|e| CoreError::Validation(e.to_string()))
    }

    /// Re-derive the window start from the current page.
    pub fn align_start(&mut self, paging: &Paging) {
        self.start = self
            .limit
            .saturating_mul(paging.current_page.max(1) - 1);
    }
}

/// Paging state derived from the last fetch's `total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paging {
    /// 1-based page index.
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_items: 0,
        }
    }
}

impl Paging {
    /// Recompute totals after a fetch.
    pub fn recompute(&mut self, total: u64, limit: u64) {
        self.total_items = total;
        self.total_pages = total.div_ceil(limit.max(1));
    }

    /// The paginator is suppressed entirely unless there is more than one
    /// page.
    pub fn is_paginator_visible(&self) -> bool {
        self.total_pages > 1
    }

    /// Apply a paginator action. Returns `true` when the listing has to be
    /// re-fetched.
    pub fn apply(&mut self, action: PageAction) -> Result<bool, CoreError> {
        match action {
            PageAction::Previous => {
                if self.current_page > 1 {
                    self.current_page -= 1;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            PageAction::Next => {
                if self.current_page < self.total_pages {
                    self.current_page += 1;
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            PageAction::Page(0) => Err(CoreError::InvalidAction(
                "Page numbers start at 1".to_string(),
            )),
            PageAction::Page(page) if page > self.total_pages.max(1) => {
                Err(CoreError::InvalidAction(format!(
                    "Page {page} is beyond the last page {}",
                    self.total_pages.max(1)
                )))
            }
            PageAction::Page(page) => {
                self.current_page = page;
                Ok(true)
            }
        }
    }
}

/// A click in the paginator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageAction {
    Previous,
    Next,
    Page(u64),
}

impl PageAction {
    /// Decode a paginator action name plus its optional page number.
    pub fn from_parts(action: &str, page: Option<u64>) -> Result<Self, CoreError> {
        match (action, page) {
            ("previous", _) => Ok(Self::Previous),
            ("next", _) => Ok(Self::Next),
            ("page", Some(page)) => Ok(Self::Page(page)),
            ("page", None) => Err(CoreError::InvalidAction(
                "Paginator action 'page' requires a page number".to_string(),
            )),
            (other, _) => Err(CoreError::InvalidAction(format!(
                "Unknown paginator action \"{other}\""
            ))),
        }
    }
}
