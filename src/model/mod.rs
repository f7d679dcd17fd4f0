pub mod locale;
pub mod node;
pub mod tree;
pub mod warning;
