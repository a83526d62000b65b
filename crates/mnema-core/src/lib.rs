// SPDX-FileCopyrightText: 2026 Mnema Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Mnema memory engine.
//!
//! This crate provides the foundational trait definitions, error types, and
//! domain types used throughout the Mnema workspace: the memory and entity
//! records, the conversation history records the windowing logic consumes,
//! and the adapter traits for the four collaborator boundaries (LLM
//! provider, embeddings, store, NER).

pub mod conversation;
pub mod entity;
pub mod error;
pub mod memory;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::MnemaError;
pub use types::{AdapterType, HealthStatus, UserId};

// Re-export all adapter traits at crate root.
pub use traits::{EmbeddingAdapter, MemoryStore, NerAdapter, PluginAdapter, ProviderAdapter};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mnema_error_has_all_variants() {
        // Verify all 8 error variants exist and can be constructed.
        let _config = MnemaError::Config("test".into());
        let _input = MnemaError::InvalidInput("test".into());
        let _store = MnemaError::Store {
            source: Box::new(std::io::Error::other("test")),
        };
        let _provider = MnemaError::Provider {
            message: "test".into(),
            source: None,
        };
        let _embedding = MnemaError::Embedding {
            message: "test".into(),
            source: None,
        };
        let _parse = MnemaError::Parse("test".into());
        let _timeout = MnemaError::Timeout {
            duration: std::time::Duration::from_secs(30),
        };
        let _internal = MnemaError::Internal("test".into());
    }

    #[test]
    fn error_helpers_build_expected_variants() {
        assert!(matches!(
            MnemaError::store(std::io::Error::other("x")),
            MnemaError::Store { .. }
        ));
        assert!(matches!(
            MnemaError::provider("x"),
            MnemaError::Provider { source: None, .. }
        ));
        assert!(matches!(
            MnemaError::embedding("x"),
            MnemaError::Embedding { source: None, .. }
        ));
    }

    #[test]
    fn adapter_type_has_four_variants() {
        use std::str::FromStr;

        let variants = [
            AdapterType::Provider,
            AdapterType::Embedding,
            AdapterType::Store,
            AdapterType::Ner,
        ];
        assert_eq!(variants.len(), 4, "AdapterType must have exactly 4 variants");

        for variant in &variants {
            let s = variant.to_string();
            let parsed = AdapterType::from_str(&s).expect("should parse back");
            assert_eq!(*variant, parsed);
        }
    }

    #[test]
    fn all_trait_modules_are_exported() {
        // If any adapter trait is missing or fails to compile, this test
        // won't compile.
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
        fn _assert_embedding_adapter<T: EmbeddingAdapter>() {}
        fn _assert_ner_adapter<T: NerAdapter>() {}
        fn _assert_memory_store<T: MemoryStore>() {}
    }
}
