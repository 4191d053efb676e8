// Cross-crate scenario tests for the generation, validation and execution pipelines

pub mod fakes;

#[cfg(test)]
mod cli_tests;
#[cfg(test)]
mod conversation_tests;
#[cfg(test)]
mod execution_tests;
#[cfg(test)]
mod strict_pipeline_tests;
