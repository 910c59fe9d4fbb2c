use chrono::Utc;

mod question_helpers;
mod reply_helpers;
mod tag_helpers;

pub use question_helpers::*;
pub use reply_helpers::*;
pub use tag_helpers::*;

struct QueryBuilder {
    query: String,
    params: Vec<String>,
    seperator: Option<&'static str>,
    counter: usize,
}

impl QueryBuilder {
    fn new(initial: String, seperator: Option<&'static str>) -> Self {
        Self {
            query: initial,
            params: vec![],
            seperator,
            counter: 0,
        }
    }

    fn add_param(mut self, filter: &str, param: Option<String>) -> Self {
        if let Some(value) = param {
            self.query.push_str(filter);
            if let Some(seperator) = self.seperator {
                self.query.push_str(seperator);
            }
            self.params.push(value);
            self.counter += 1;
        }
        self
    }

    fn trim(mut self) -> Self {
        if let Some(seperator) = self.seperator {
            self.query = self.query.trim_end_matches(seperator).to_string();
        }
        self
    }

    fn is_empty(&self) -> bool {
        self.counter == 0
    }

    fn build(mut self) -> (String, Vec<String>) {
        self = self.trim();
        (self.query, self.params)
    }
}

// ----------------- Helper Functions -----------------

// The store assigns identifiers on insert; they are opaque hex strings as
// far as the rest of the system is concerned.
fn generate_id() -> String {
    format!("{:016x}", rand::random::<u64>())
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
