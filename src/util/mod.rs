//! Shared lexical helpers: title cleansing and URL normalization.

pub mod title;
pub mod urls;

pub use title::{clean_title, extract_quality, extract_type_label, significant_words, title_matches};
pub use urls::{extract_host, is_skippable_url, normalize_page_url, strip_query};
