//! Snapshot tests for the Ollama integration

#[cfg(test)]
mod snapshot_tests {
    use crate::api::EmbedRequest;
    use crate::client::build_request;
    use crate::{GenerationConfig, OllamaConfig};
    use insta::{assert_snapshot, assert_yaml_snapshot};

    #[test]
    fn test_config_snapshot() {
        assert_yaml_snapshot!(OllamaConfig::default(), @r###"
        base_url: "http://localhost:11434"
        timeout_secs: 120
        "###);
    }

    #[test]
    fn test_config_from_lookup() {
        let config = OllamaConfig::from_lookup(|key| match key {
            "OLLAMA_HOST" => Some("0.0.0.0:11500/".to_string()),
            "OLLAMA_TIMEOUT_SECS" => Some("30".to_string()),
            _ => None,
        })
        .unwrap();

        assert_eq!(config.base_url, "http://0.0.0.0:11500");
        assert_eq!(config.timeout_secs, 30);
        assert_eq!(config.endpoint("/api/tags"), "http://0.0.0.0:11500/api/tags");
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(OllamaConfig::new("ftp://localhost", 10).is_err());
        assert!(OllamaConfig::new("not a url", 10).is_err());
        assert!(
            OllamaConfig::from_lookup(|key| (key == "OLLAMA_TIMEOUT_SECS").then(|| "soon".to_string()))
                .is_err()
        );
    }

    #[test]
    fn test_generate_request_body() {
        let config = GenerationConfig::default();
        let body = serde_json::to_string(&build_request("Question: hi", &config)).unwrap();
        assert_snapshot!(body, @r###"{"model":"phi3","prompt":"Question: hi","stream":false}"###);

        let config = GenerationConfig {
            model_id: "llama3".to_string(),
            temperature: Some(0.0),
        };
        let body = serde_json::to_string(&build_request("hi", &config)).unwrap();
        assert_snapshot!(
            body,
            @r###"{"model":"llama3","prompt":"hi","stream":false,"options":{"temperature":0.0}}"###
        );
    }

    #[test]
    fn test_embed_request_body() {
        let input = vec!["first".to_string(), "second".to_string()];
        let request = EmbedRequest {
            model: "all-minilm",
            input: &input,
        };
        assert_snapshot!(
            serde_json::to_string(&request).unwrap(),
            @r###"{"model":"all-minilm","input":["first","second"]}"###
        );
    }
}
