//! assay-test - Test execution for Assay
//!
//! A [`TestSuiteInterface`] binds one table to a session, a fixed sample and
//! a bounded query runner, then runs test cases through validators resolved
//! from a [`ValidatorRegistry`].

pub mod catalog;
pub mod error;
pub mod interface;
pub mod runner;
pub mod runtime_params;
pub mod validator;

#[cfg(test)]
mod test_support;

pub use catalog::{CatalogClient, InMemoryCatalog};
pub use error::{
    CatalogError, CatalogResult, ExecutionCause, ExecutionError, InterfaceError, InterfaceResult,
    ParameterError, ParameterResult, ResolutionError, RunnerError, RunnerResult, ValidatorError,
    ValidatorResult,
};
pub use interface::{InterfaceBuilder, InterfaceState, TestSuiteInterface};
pub use runner::{Aggregate, QueryRunner, DEFAULT_TIMEOUT};
pub use runtime_params::{
    EnumValuesParams, EnumValuesSetter, RuntimeParameterSetter, SetterConstructor, SetterContext,
};
pub use validator::{
    constructor, Validator, ValidatorConstructor, ValidatorContext, ValidatorEntry,
    ValidatorRegistry,
};
