pub mod extractor;
pub mod preprocess;

// Re-export commonly used types
pub use extractor::OnnxExtractor;
