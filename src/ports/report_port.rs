//! Report output port.

use crate::domain::error::ChecklistError;
use crate::domain::evaluate::Evaluation;

pub trait ReportPort {
    fn write(&self, evaluation: &Evaluation, output_path: &str) -> Result<(), ChecklistError>;
}
