pub use crate::errors::DefinjectError;
pub use crate::injector::{
    GenerateOptions, InjectOptions, Injector, InjectorBuilder, InsertLocation, ScanOptions,
};
pub use crate::path::{DefinitionPath, IntoDefinitionPath};
pub use crate::store::{DefineOptions, DefinitionStore};
pub use crate::tree::export::{Condensed, Export, FullExport, PartialExport, Shape, View};
pub use crate::value::Value;

pub mod errors;
pub mod hooks;
pub mod injector;
pub mod path;
pub mod store;
pub mod tree;
pub mod value;
