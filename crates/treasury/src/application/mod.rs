mod treasury;

pub use treasury::Treasury;
