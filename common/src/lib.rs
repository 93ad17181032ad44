//! DocSnap Common Library
//!
//! CLI・プロキシサーバ・Web(WASM)で共有される型と処理

pub mod types;
pub mod error;
pub mod encoder;
pub mod prompts;
pub mod parser;
pub mod render;
pub mod model;
pub mod session;

pub use types::{
    AnalysisOutcome, AnalyzeRequest, AnalyzeResponse, ErrorResponse, InlinePayload, Medicine,
    SelectedFile, DEFAULT_LANGUAGE, LANGUAGES,
};
pub use error::{Error, Result};
pub use encoder::{encode, encode_all, to_data_url};
pub use prompts::{build_prescription_prompt, NO_MEDICINE_MARKER};
pub use parser::{extract_html, parse_medicine_response};
pub use render::{escape_html, render_html, render_text};
pub use model::{analyze_payloads, GenerativeModel, ModelReply};
pub use session::{AnalysisState, AnalysisTicket, Session};
