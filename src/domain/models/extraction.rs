// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// 提取请求
///
/// 只能由通过校验的 DTO 构造（见 `application::dto::extract_request`），
/// 构造后不可变。保证 `prompt` 与 `output_schema` 至少存在一个，且 URL 已通过 SSRF 检查。
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    url: String,
    prompt: Option<String>,
    output_schema: Option<Map<String, Value>>,
}

impl ExtractionRequest {
    pub(crate) fn from_validated(
        url: String,
        prompt: Option<String>,
        output_schema: Option<Map<String, Value>>,
    ) -> Self {
        Self {
            url,
            prompt,
            output_schema,
        }
    }

    /// 调用方提交的原始 URL
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn output_schema(&self) -> Option<&Map<String, Value>> {
        self.output_schema.as_ref()
    }
}

/// 提取结果元数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// 来源 URL，提供方未回显时回退为请求 URL
    #[serde(rename = "sourceURL")]
    pub source_url: String,
}

/// 提取结果
///
/// `data` 为结构化 JSON（若提供方返回），否则为 markdown 文本，否则为 `null`。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub success: bool,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ExtractionMetadata>,
}

/// 向提取提供方请求的输出格式
///
/// 序列化为 `"markdown"` 或 `{"type": "json", "schema"?, "prompt"?}`。
#[derive(Debug, Clone, PartialEq)]
pub enum OutputFormat {
    Markdown,
    Json {
        schema: Option<Map<String, Value>>,
        prompt: Option<String>,
    },
}

impl Serialize for OutputFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OutputFormat::Markdown => serializer.serialize_str("markdown"),
            OutputFormat::Json { schema, prompt } => {
                let len = 1 + usize::from(schema.is_some()) + usize::from(prompt.is_some());
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("type", "json")?;
                if let Some(schema) = schema {
                    map.serialize_entry("schema", schema)?;
                }
                if let Some(prompt) = prompt {
                    map.serialize_entry("prompt", prompt)?;
                }
                map.end()
            }
        }
    }
}

/// 提供方返回的页面元数据
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, rename = "sourceURL")]
    pub source_url: Option<String>,
}

/// 提供方返回的抓取文档
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ScrapeDocument {
    #[serde(default)]
    pub markdown: Option<String>,
    #[serde(default)]
    pub json: Option<Value>,
    #[serde(default)]
    pub metadata: Option<DocumentMetadata>,
}
