//! Joint descriptors and interface-contract validation.
//!
//! Each declared joint must expose exactly one command interface named
//! "velocity" and exactly two state interfaces named "position" then
//! "velocity", in that order. Validation runs as a single declarative
//! pass against an expected-interface table and reports *all* violations
//! rather than bailing on the first, to aid diagnosability.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical position state interface name.
pub const HW_IF_POSITION: &str = "position";
/// Canonical velocity state/command interface name.
pub const HW_IF_VELOCITY: &str = "velocity";

/// Interface contract for a differential-drive wheel joint.
const WHEEL_COMMAND_INTERFACES: &[&str] = &[HW_IF_VELOCITY];
const WHEEL_STATE_INTERFACES: &[&str] = &[HW_IF_POSITION, HW_IF_VELOCITY];

/// Per-joint interface declaration, supplied by the descriptor collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointDescriptor {
    /// Joint name (matches a wheel name)
    pub name: String,
    /// Declared command interface names
    #[serde(default)]
    pub command_interfaces: Vec<String>,
    /// Declared state interface names, in order
    #[serde(default)]
    pub state_interfaces: Vec<String>,
}

impl JointDescriptor {
    /// The canonical descriptor for a velocity-controlled wheel joint.
    pub fn wheel(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command_interfaces: vec![HW_IF_VELOCITY.to_string()],
            state_interfaces: vec![HW_IF_POSITION.to_string(), HW_IF_VELOCITY.to_string()],
        }
    }
}

/// One violation of the joint interface contract.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractViolation {
    /// Offending joint name
    pub joint: String,
    /// Human-readable description of the mismatch
    pub detail: String,
}

impl ContractViolation {
    /// Create a violation record.
    pub fn new(joint: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            joint: joint.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for ContractViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "joint '{}' {}", self.joint, self.detail)
    }
}

/// Validate declared joints against the wheel interface contract.
///
/// Returns every violation found across all joints; an empty vector means
/// the contract holds.
pub fn validate_joints(joints: &[JointDescriptor]) -> Vec<ContractViolation> {
    let mut violations = Vec::new();

    for joint in joints {
        check_interfaces(
            joint,
            "command",
            &joint.command_interfaces,
            WHEEL_COMMAND_INTERFACES,
            &mut violations,
        );
        check_interfaces(
            joint,
            "state",
            &joint.state_interfaces,
            WHEEL_STATE_INTERFACES,
            &mut violations,
        );
    }

    violations
}

/// Compare one declared interface list against its expected table entry.
fn check_interfaces(
    joint: &JointDescriptor,
    kind: &str,
    declared: &[String],
    expected: &[&str],
    violations: &mut Vec<ContractViolation>,
) {
    if declared.len() != expected.len() {
        violations.push(ContractViolation::new(
            &joint.name,
            format!(
                "has {} {kind} interfaces, {} expected",
                declared.len(),
                expected.len()
            ),
        ));
        return;
    }

    for (idx, (got, want)) in declared.iter().zip(expected).enumerate() {
        if got != want {
            violations.push(ContractViolation::new(
                &joint.name,
                format!("has '{got}' as {kind} interface {idx}, '{want}' expected"),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_wheel_joints_pass() {
        let joints = vec![
            JointDescriptor::wheel("left_wheel"),
            JointDescriptor::wheel("right_wheel"),
        ];
        assert!(validate_joints(&joints).is_empty());
    }

    #[test]
    fn wrong_command_count_is_reported() {
        let mut joint = JointDescriptor::wheel("left_wheel");
        joint.command_interfaces.clear();
        let violations = validate_joints(&[joint]);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].detail.contains("0 command interfaces"));
    }

    #[test]
    fn wrong_state_order_is_reported() {
        let mut joint = JointDescriptor::wheel("left_wheel");
        joint.state_interfaces.swap(0, 1);
        let violations = validate_joints(&[joint]);
        // Both slots mismatch when position/velocity are swapped
        assert_eq!(violations.len(), 2);
        assert!(violations[0].detail.contains("state interface 0"));
    }

    #[test]
    fn wrong_command_name_is_reported() {
        let mut joint = JointDescriptor::wheel("right_wheel");
        joint.command_interfaces[0] = "effort".to_string();
        let violations = validate_joints(&[joint]);
        assert_eq!(violations.len(), 1);
        assert!(violations[0].detail.contains("'effort'"));
        assert!(violations[0].detail.contains("'velocity' expected"));
    }

    #[test]
    fn all_violations_collected_across_joints() {
        let mut left = JointDescriptor::wheel("left_wheel");
        left.command_interfaces.clear();
        let mut right = JointDescriptor::wheel("right_wheel");
        right.state_interfaces.push("effort".to_string());

        let violations = validate_joints(&[left, right]);
        assert_eq!(violations.len(), 2);
        assert_eq!(violations[0].joint, "left_wheel");
        assert_eq!(violations[1].joint, "right_wheel");
    }

    #[test]
    fn empty_joint_list_is_valid() {
        assert!(validate_joints(&[]).is_empty());
    }
}
