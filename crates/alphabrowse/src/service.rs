use crate::backend::BrowseBackend;
use crate::prelude::*;
use alphabrowse_core::access::{browse_tags, PermissionTable};
use alphabrowse_core::browse::{
    after_fallback, after_primary, navigation, primary_query, BrowseRequest, BrowseStep,
    BrowseViewResult, Navigation,
};
use alphabrowse_core::config::{BrowseType, Config};
use alphabrowse_core::nearby::{build_nearby_output, nearby_query, NearbyOutput};
use serde::Serialize;

/// Everything a browse page needs to render, including the selectors
#[derive(Debug, Clone, Serialize)]
pub struct BrowseOutput {
    pub source: String,
    pub from: Option<String>,
    pub types: Vec<BrowseType>,
    /// Extra columns returned for this source
    pub extras: Vec<String>,
    pub result: BrowseViewResult,
    pub navigation: Navigation,
}

/// Alphabetic browse over an injected backend
#[derive(Debug)]
pub struct BrowseService<B> {
    config: Config,
    access: PermissionTable,
    backend: B,
}

impl<B: BrowseBackend> BrowseService<B> {
    pub fn new(config: Config, backend: B) -> Self {
        let access = config.access.permission_table();
        Self {
            config,
            access,
            backend,
        }
    }

    pub fn types(&self) -> &[BrowseType] {
        &self.config.alphabrowse.types
    }

    fn check_access(&self, source: &str) -> Result<(), Error> {
        let tags = browse_tags(source);
        let tags: Vec<&str> = tags.iter().map(String::as_str).collect();
        self.access.check(&tags, &self.config.access.granted)?;
        Ok(())
    }

    /// Build a request from user input using the configured page size,
    /// padding and highlighting
    pub fn request(
        &self,
        source: &str,
        from: Option<String>,
        page: i64,
    ) -> Result<BrowseRequest, Error> {
        let settings = &self.config.alphabrowse;

        if !source.is_empty() {
            if !settings.has_type(source) {
                return Err(Error::InvalidRequest(format!(
                    "unknown browse source '{source}'"
                )));
            }
            self.check_access(source)?;
        }

        let request = BrowseRequest::new(
            source,
            from,
            page,
            settings.page_size,
            settings.rows_before,
            settings.highlighting,
        )?;

        Ok(request.with_extra_params(settings.extra_params(source)))
    }

    /// Run the browse calculator, issuing at most two sequential queries
    ///
    /// Backend failures never escape: they come back as a failed view.
    pub async fn compute_browse(&self, request: &BrowseRequest) -> BrowseViewResult {
        let Some(primary) = primary_query(request) else {
            return BrowseViewResult::empty();
        };

        let outcome = self.backend.query(&primary).await;
        if let Err(err) = &outcome {
            log::warn!("Browse query for {} failed: {}", primary.source, err);
        }

        let fallback = match after_primary(request, &primary, outcome) {
            BrowseStep::Done(view) => return view,
            BrowseStep::Fallback(fallback) => fallback,
        };

        log::debug!(
            "Page {} of {} is empty, retrying page {}",
            primary.page,
            primary.source,
            fallback.page
        );

        let outcome = self.backend.query(&fallback).await;
        if let Err(err) = &outcome {
            log::warn!("Fallback browse query for {} failed: {}", fallback.source, err);
        }

        after_fallback(request, &primary, &fallback, outcome)
    }

    /// Validate user input, browse, and wrap the result for display
    pub async fn browse(
        &self,
        source: &str,
        from: Option<String>,
        page: i64,
    ) -> Result<BrowseOutput, Error> {
        let request = self.request(source, from, page)?;
        let result = self.compute_browse(&request).await;
        let navigation = navigation(&request, &result);

        let extras = self
            .config
            .alphabrowse
            .extras
            .get(source)
            .map(|fields| {
                fields
                    .split(':')
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(BrowseOutput {
            source: request.source().to_string(),
            from: request.from().map(str::to_string),
            types: self.types().to_vec(),
            extras,
            result,
            navigation,
        })
    }

    /// Titled records shelved around `from` in the nearby index
    pub async fn nearby(&self, from: &str) -> Result<NearbyOutput, Error> {
        let settings = &self.config.nearby;
        self.check_access(&settings.source)?;

        let Some(query) = nearby_query(settings, from) else {
            return Err(Error::InvalidRequest(
                "a starting term is required for nearby items".to_string(),
            ));
        };

        let page = self.backend.query(&query).await?;
        Ok(build_nearby_output(&settings.source, from, &page))
    }
}
