// Input tables: delimited persistence plus the typed tables built on it.

pub mod delimited;
pub mod labels;
pub mod topic_table;
pub mod topic_words;
