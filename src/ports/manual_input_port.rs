//! Persistence port for manual inputs.

use crate::domain::error::ChecklistError;
use crate::domain::manual_input::ManualInputs;

pub trait ManualInputPort {
    /// Stored inputs, or defaults when nothing has been saved yet.
    fn load(&self) -> Result<ManualInputs, ChecklistError>;
    fn save(&self, inputs: &ManualInputs) -> Result<(), ChecklistError>;
}
