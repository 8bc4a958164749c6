use crate::report::Verdict;
use serde::{Deserialize, Deserializer, Serialize};

/// Body of a URL inspection request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionRequest<'a> {
    pub inspection_url: &'a str,
    pub site_url: &'a str,
}

/// Response of the URL inspection endpoint
///
/// Every level is optional; the accessors return `None` for anything the
/// service left out.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionResponse {
    #[serde(default)]
    pub inspection_result: Option<InspectionResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectionResult {
    #[serde(default)]
    pub index_status_result: Option<IndexStatusResult>,
    #[serde(default)]
    pub mobile_usability_result: Option<MobileUsabilityResult>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStatusResult {
    #[serde(default)]
    pub indexing_state: Option<String>,
    #[serde(default)]
    pub last_crawl_time: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MobileUsabilityResult {
    /// `None` when absent or not a string
    #[serde(default, deserialize_with = "lenient_verdict")]
    pub verdict: Option<Verdict>,
}

/// Reads a verdict without letting a malformed value fail the whole response
fn lenient_verdict<'de, D>(deserializer: D) -> Result<Option<Verdict>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(verdict) => Ok(Some(Verdict::from(verdict))),
        _ => Ok(None),
    }
}

impl InspectionResponse {
    fn index_status(&self) -> Option<&IndexStatusResult> {
        self.inspection_result
            .as_ref()
            .and_then(|r| r.index_status_result.as_ref())
    }

    /// `inspectionResult.indexStatusResult.indexingState`
    pub fn indexing_state(&self) -> Option<&str> {
        self.index_status()
            .and_then(|s| s.indexing_state.as_deref())
    }

    /// `inspectionResult.indexStatusResult.lastCrawlTime`
    pub fn last_crawl_time(&self) -> Option<&str> {
        self.index_status()
            .and_then(|s| s.last_crawl_time.as_deref())
    }

    /// `inspectionResult.mobileUsabilityResult.verdict`
    pub fn mobile_verdict(&self) -> Option<Verdict> {
        self.inspection_result
            .as_ref()
            .and_then(|r| r.mobile_usability_result.as_ref())
            .and_then(|m| m.verdict.clone())
    }
}
