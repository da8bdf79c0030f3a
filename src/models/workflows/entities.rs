use serde::{Deserialize, Serialize};

/// 审批流程：文档依次经过的教职工链
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: i64,
    pub department_id: i64,
    pub name: String,
    /// 有序的教职工 ID
    pub steps: Vec<i64>,
    pub created_by: i64,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Workflow {
    /// 教职工在流程中的位置
    pub fn step_index(&self, staff_id: i64) -> Option<usize> {
        self.steps.iter().position(|&id| id == staff_id)
    }

    pub fn step(&self, index: usize) -> Option<i64> {
        self.steps.get(index).copied()
    }

    /// 校验步骤：非空且不重复
    pub fn validate_steps(steps: &[i64]) -> Result<(), String> {
        if steps.is_empty() {
            return Err("Workflow must contain at least one step".to_string());
        }
        let mut seen = std::collections::HashSet::with_capacity(steps.len());
        for id in steps {
            if !seen.insert(id) {
                return Err(format!("Staff {id} appears more than once in the workflow"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn workflow(steps: Vec<i64>) -> Workflow {
        Workflow {
            id: 1,
            department_id: 1,
            name: "Final year project".to_string(),
            steps,
            created_by: 1,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_step_lookup() {
        let w = workflow(vec![4, 9, 2]);
        assert_eq!(w.step_index(9), Some(1));
        assert_eq!(w.step_index(5), None);
        assert_eq!(w.step(2), Some(2));
        assert_eq!(w.step(3), None);
    }

    #[test]
    fn test_validate_steps() {
        assert!(Workflow::validate_steps(&[1, 2, 3]).is_ok());
        assert!(Workflow::validate_steps(&[]).is_err());
        assert!(Workflow::validate_steps(&[1, 2, 1]).is_err());
    }
}
