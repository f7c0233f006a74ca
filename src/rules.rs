//! Business rules applied to incoming records before they are stored.

use crate::error::AppError;
use crate::model::{Admin, AskQuestion, Campus, Exercise, OrderTeacher, Student, Teacher};

/// Platform defaults filled into blank fields.
#[derive(Clone, Debug)]
pub struct Defaults {
    pub student_icon: String,
    pub teacher_icon: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            student_icon: "default_boy.png".into(),
            teacher_icon: "default_teacher.png".into(),
        }
    }
}

/// Grade names as shown in the admin UI, in code order starting at 1.
const GRADE_NAMES: &[&str] = &[
    "一年级", "二年级", "三年级", "四年级", "五年级", "六年级", "初一", "初二", "初三", "高一", "高二", "高三",
];

/// Grade name to grade code; 0 when the name is not recognized.
pub fn grade_code(name: &str) -> i32 {
    GRADE_NAMES
        .iter()
        .position(|g| *g == name.trim())
        .map(|i| i as i32 + 1)
        .unwrap_or(0)
}

/// Normalize and check a record on its way in (insert and update). A campus id of 0 means
/// "no campus".
pub trait Prepare {
    fn prepare(&mut self, _defaults: &Defaults) -> Result<(), AppError> {
        Ok(())
    }
}

fn require(field: &str, value: &str) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

impl Prepare for Student {
    fn prepare(&mut self, defaults: &Defaults) -> Result<(), AppError> {
        require("Sname", &self.sname)?;
        self.cid = self.cid.filter(|cid| *cid != 0);
        self.sgrade = grade_code(&self.sgrade_name);
        if self.sicon.is_empty() {
            self.sicon = defaults.student_icon.clone();
        }
        Ok(())
    }
}

impl Prepare for Teacher {
    fn prepare(&mut self, defaults: &Defaults) -> Result<(), AppError> {
        require("Tname", &self.tname)?;
        self.cid = self.cid.filter(|cid| *cid != 0);
        if self.ticon.is_empty() {
            self.ticon = defaults.teacher_icon.clone();
        }
        Ok(())
    }
}

impl Prepare for Admin {
    fn prepare(&mut self, _defaults: &Defaults) -> Result<(), AppError> {
        require("Aname", &self.aname)
    }
}

impl Prepare for Campus {
    fn prepare(&mut self, _defaults: &Defaults) -> Result<(), AppError> {
        require("Cname", &self.cname)
    }
}

impl Prepare for Exercise {}
impl Prepare for OrderTeacher {}
impl Prepare for AskQuestion {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_names_map_to_codes() {
        assert_eq!(grade_code("一年级"), 1);
        assert_eq!(grade_code("初一"), 7);
        assert_eq!(grade_code(" 高三 "), 12);
        assert_eq!(grade_code("大一"), 0);
        assert_eq!(grade_code(""), 0);
    }

    #[test]
    fn blank_student_icon_gets_default() {
        let mut s = Student {
            sname: "amy".into(),
            sgrade_name: "初二".into(),
            ..Student::default()
        };
        s.prepare(&Defaults::default()).unwrap();
        assert_eq!(s.sicon, "default_boy.png");
        assert_eq!(s.sgrade, 8);
    }

    #[test]
    fn populated_icon_is_kept() {
        let mut t = Teacher {
            tname: "li".into(),
            ticon: "li.png".into(),
            ..Teacher::default()
        };
        t.prepare(&Defaults::default()).unwrap();
        assert_eq!(t.ticon, "li.png");
    }

    #[test]
    fn login_name_is_required() {
        let mut a = Admin::default();
        assert!(matches!(a.prepare(&Defaults::default()), Err(AppError::Validation(_))));
    }

    #[test]
    fn zero_campus_means_none() {
        let mut s = Student {
            sname: "amy".into(),
            cid: Some(0),
            ..Student::default()
        };
        s.prepare(&Defaults::default()).unwrap();
        assert_eq!(s.cid, None);
    }
}
