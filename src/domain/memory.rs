use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /v1/memories`; also the shape of one `import` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMemory {
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub importance: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Body of `POST /v1/memories/search`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_score: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Body of `PATCH /v1/memories/{id}`
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub importance: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl MemoryUpdate {
    pub fn is_empty(&self) -> bool {
        self.content.is_none() && self.importance.is_none() && self.tags.is_none()
    }
}

/// Body of `POST /v1/memories/{id}/relations`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationRequest {
    pub target_id: String,
    #[serde(rename = "type")]
    pub relation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
}

/// Body of `POST /v1/consolidate`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsolidateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_memory_wire_shape() {
        let memory = NewMemory {
            content: "hello".to_string(),
            namespace: Some("work".to_string()),
            importance: Some(0.8),
            tags: vec!["a".to_string()],
            kind: Some("fact".to_string()),
            metadata: None,
        };

        assert_eq!(
            serde_json::to_value(&memory).unwrap(),
            json!({
                "content": "hello",
                "namespace": "work",
                "importance": 0.8,
                "tags": ["a"],
                "type": "fact"
            })
        );
    }

    #[test]
    fn test_import_entry_accepts_minimal_record() {
        let memory: NewMemory = serde_json::from_value(json!({"content": "x"})).unwrap();
        assert_eq!(memory.content, "x");
        assert!(memory.tags.is_empty());
    }

    #[test]
    fn test_relation_and_search_use_camel_case() {
        let relation = RelationRequest {
            target_id: "m2".to_string(),
            relation: "supports".to_string(),
            weight: None,
        };
        assert_eq!(
            serde_json::to_value(&relation).unwrap(),
            json!({"targetId": "m2", "type": "supports"})
        );

        let search = SearchRequest {
            query: "q".to_string(),
            namespace: None,
            limit: 5,
            min_score: Some(0.5),
            tags: Vec::new(),
        };
        assert_eq!(
            serde_json::to_value(&search).unwrap(),
            json!({"query": "q", "limit": 5, "minScore": 0.5})
        );
    }
}
