//! Component state for the CSV mapper.
//!
//! Everything that decides what gets uploaded lives in the `MapperState` value
//! from `common`; this struct only adds the browser handles that cannot be
//! part of it.

use common::model::state::MapperState;
use yew::prelude::*;

pub struct CsvMapperComponent {
    /// Parsed file, column mapping and submission status.
    pub mapper: MapperState,

    /// The file picked by the user, re-sent as-is on submit.
    pub file: Option<web_sys::File>,

    /// Reference to the hidden `<input type="file">`.
    pub file_input_ref: NodeRef,
}

impl CsvMapperComponent {
    pub fn new() -> Self {
        Self {
            mapper: MapperState::default(),
            file: None,
            file_input_ref: Default::default(),
        }
    }
}
