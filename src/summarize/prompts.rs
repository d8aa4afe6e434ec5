//! Instruction templates for the map and reduce model calls

use crate::error::{Result, SummarizeError};

pub const MAP_PLACEHOLDER: &str = "{context}";
pub const REDUCE_PLACEHOLDER: &str = "{docs}";

/// Summarize one page
pub const MAP_TEMPLATE: &str = "Resuma o seguinte texto de forma clara e objetiva: {context} Resumo:";

/// Merge several summaries into one
pub const REDUCE_TEMPLATE: &str = "Aqui estão vários resumos: {docs} Junte todos em um único resumo coeso:";

/// A template with a single named placeholder
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    placeholder: &'static str,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>, placeholder: &'static str) -> Result<Self> {
        let template = template.into();
        if !template.contains(placeholder) {
            return Err(SummarizeError::Config(format!(
                "Prompt template is missing the {} placeholder",
                placeholder
            )));
        }
        Ok(Self { template, placeholder })
    }

    pub fn map() -> Self {
        Self {
            template: MAP_TEMPLATE.to_string(),
            placeholder: MAP_PLACEHOLDER,
        }
    }

    pub fn reduce() -> Self {
        Self {
            template: REDUCE_TEMPLATE.to_string(),
            placeholder: REDUCE_PLACEHOLDER,
        }
    }

    /// Interpolate `value` at the placeholder.
    ///
    /// Only the first occurrence is replaced so that page text containing the
    /// placeholder literally is passed through untouched.
    pub fn render(&self, value: &str) -> String {
        self.template.replacen(self.placeholder, value, 1)
    }
}
