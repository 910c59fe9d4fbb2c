mod request;
mod response;
mod wrapper;

pub use request::*;
pub use response::*;
pub use wrapper::*;

use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize, Debug)]
pub struct QuestionQueryParams {
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}
