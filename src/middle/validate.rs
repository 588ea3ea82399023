//! IR structural validation
//!
//! Every label is defined once and every jump names a defined label.
//! A failure here means the IR producer is broken, so it is fatal.

use super::ir::{Instruction, IrError};
use std::collections::HashMap;

/// Check label uniqueness and jump targets
pub fn validate(instructions: &[Instruction]) -> Result<(), IrError> {
    label_positions(instructions)?;
    Ok(())
}

/// Build the label → instruction index map, validating along the way
pub fn label_positions(instructions: &[Instruction]) -> Result<HashMap<String, usize>, IrError> {
    let mut labels = HashMap::new();
    for (index, instruction) in instructions.iter().enumerate() {
        if let Some(label) = instruction.label() {
            if labels.insert(label.to_string(), index).is_some() {
                return Err(IrError::DuplicateLabel {
                    label: label.to_string(),
                    index,
                });
            }
        }
    }
    for (index, instruction) in instructions.iter().enumerate() {
        if let Some(target) = instruction.jump_target() {
            if !labels.contains_key(target) {
                return Err(IrError::MissingLabel {
                    label: target.to_string(),
                    index,
                    instruction: instruction.to_string(),
                });
            }
        }
    }
    Ok(labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middle::ir::text::parse_program;

    #[test]
    fn test_valid_program() {
        let program = parse_program("L0:\nprint 1\ngoto L0\n").unwrap();
        assert!(validate(&program).is_ok());
        assert_eq!(label_positions(&program).unwrap().get("L0"), Some(&0));
    }

    #[test]
    fn test_duplicate_label() {
        let program = parse_program("L0:\nL0:\n").unwrap();
        assert_eq!(
            validate(&program),
            Err(IrError::DuplicateLabel {
                label: "L0".into(),
                index: 1
            })
        );
    }

    #[test]
    fn test_missing_label() {
        let program = parse_program("print 1\nif 1 goto L7\n").unwrap();
        let err = validate(&program).unwrap_err();
        assert!(matches!(&err, IrError::MissingLabel { label, index: 1, .. } if label == "L7"));
        assert!(err.to_string().contains("if 1 goto L7"));
    }
}
