// Library root
// ------------
// The binary (`main.rs`) only wires these modules together and turns the
// pipeline result into an exit code.
//
// Module responsibilities:
// - `api`: the two HTTP calls (registration, submission) and their DTOs.
// - `config`: run configuration read from environment variables.
// - `query`: the fixed SQL answer and the registration-number variant rule.
// - `recorder`: best-effort local copy of the query.
// - `pipeline`: runs the steps in order and reports the first fatal error.
pub mod api;
pub mod config;
pub mod pipeline;
pub mod query;
pub mod recorder;
