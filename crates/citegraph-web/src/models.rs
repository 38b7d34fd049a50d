use citegraph_core::ReferenceEntry;
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ProcessRequest {
    pub pdf_url: String,
    pub api_key: String,
}

#[derive(Serialize)]
pub struct ProcessResponse {
    pub status: String,
    pub session_id: String,
    pub paper_id: String,
    pub extracted_text: String,
    /// Image identifiers usable with the image lookup endpoint
    /// (`<paper_id>/<file_name>`).
    pub images: Vec<String>,
}

#[derive(Deserialize)]
pub struct ReferencesRequest {
    pub session_id: String,
}

#[derive(Serialize)]
pub struct ReferenceJson {
    pub reference: String,
    pub arxiv_pdf_link: Option<String>,
}

impl From<&ReferenceEntry> for ReferenceJson {
    fn from(entry: &ReferenceEntry) -> Self {
        ReferenceJson {
            reference: entry.raw_text.clone(),
            arxiv_pdf_link: entry.resolved_link.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct ReferencesResponse {
    pub status: String,
    /// The seed paper's resolved reference list.
    pub references: Vec<ReferenceJson>,
    /// Extracted text of the first newly-discovered paper, when any
    /// reference was crawled successfully.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_reference_text: Option<String>,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub status: String,
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        ErrorBody {
            status: "error".into(),
            error: message.into(),
        }
    }
}
