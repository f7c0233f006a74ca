//! The school's entities. JSON field names are PascalCase; columns are their snake_case form.

use crate::case::to_pascal_case;
use crate::model::{Column, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase", default)]
pub struct Student {
    pub sid: i64,
    /// Login name.
    pub sname: String,
    /// Display name.
    pub snickname: String,
    pub sgrade: i32,
    pub sgrade_name: String,
    pub sicon: String,
    pub sphone: String,
    pub cid: Option<i64>,
}

sort_fields! {
    StudentSort {
        Sid => "sid",
        Sname => "sname",
        Snickname => "snickname",
        Sgrade => "sgrade",
        Cid => "cid",
    }
    natural = Sid
}

impl Record for Student {
    type Sort = StudentSort;
    const KIND: &'static str = "student";
    const TABLE: &'static str = "student";
    const KEY: &'static str = "sid";
    const COLUMNS: &'static [Column] = &[
        Column::new("sid", "bigint"),
        Column::new("sname", "text"),
        Column::new("snickname", "text"),
        Column::new("sgrade", "integer"),
        Column::new("sgrade_name", "text"),
        Column::new("sicon", "text"),
        Column::new("sphone", "text"),
        Column::nullable("cid", "bigint"),
    ];
    const UNIQUE: &'static [&'static str] = &["sname"];
    const FILTERS: &'static [&'static str] = &["cid"];

    fn key(&self) -> i64 {
        self.sid
    }

    fn set_key(&mut self, key: i64) {
        self.sid = key;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase", default)]
pub struct Teacher {
    pub tid: i64,
    pub tname: String,
    pub tnickname: String,
    pub tsubject: String,
    pub ticon: String,
    pub tphone: String,
    pub cid: Option<i64>,
}

sort_fields! {
    TeacherSort {
        Tid => "tid",
        Tname => "tname",
        Tnickname => "tnickname",
        Tsubject => "tsubject",
        Cid => "cid",
    }
    natural = Tid
}

impl Record for Teacher {
    type Sort = TeacherSort;
    const KIND: &'static str = "teacher";
    const TABLE: &'static str = "teacher";
    const KEY: &'static str = "tid";
    const COLUMNS: &'static [Column] = &[
        Column::new("tid", "bigint"),
        Column::new("tname", "text"),
        Column::new("tnickname", "text"),
        Column::new("tsubject", "text"),
        Column::new("ticon", "text"),
        Column::new("tphone", "text"),
        Column::nullable("cid", "bigint"),
    ];
    const UNIQUE: &'static [&'static str] = &["tname"];
    const FILTERS: &'static [&'static str] = &["cid"];

    fn key(&self) -> i64 {
        self.tid
    }

    fn set_key(&mut self, key: i64) {
        self.tid = key;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase", default)]
pub struct Admin {
    pub aid: i64,
    pub aname: String,
    pub anickname: String,
    pub aphone: String,
}

sort_fields! {
    AdminSort {
        Aid => "aid",
        Aname => "aname",
        Anickname => "anickname",
    }
    natural = Aid
}

impl Record for Admin {
    type Sort = AdminSort;
    const KIND: &'static str = "admin";
    const TABLE: &'static str = "admin";
    const KEY: &'static str = "aid";
    const COLUMNS: &'static [Column] = &[
        Column::new("aid", "bigint"),
        Column::new("aname", "text"),
        Column::new("anickname", "text"),
        Column::new("aphone", "text"),
    ];
    const UNIQUE: &'static [&'static str] = &["aname"];

    fn key(&self) -> i64 {
        self.aid
    }

    fn set_key(&mut self, key: i64) {
        self.aid = key;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase", default)]
pub struct Campus {
    pub cid: i64,
    pub cname: String,
    pub caddress: String,
}

sort_fields! {
    CampusSort {
        Cid => "cid",
        Cname => "cname",
    }
    natural = Cid
}

impl Record for Campus {
    type Sort = CampusSort;
    const KIND: &'static str = "campus";
    const TABLE: &'static str = "campus";
    const KEY: &'static str = "cid";
    const COLUMNS: &'static [Column] = &[
        Column::new("cid", "bigint"),
        Column::new("cname", "text"),
        Column::new("caddress", "text"),
    ];
    const UNIQUE: &'static [&'static str] = &["cname"];

    fn key(&self) -> i64 {
        self.cid
    }

    fn set_key(&mut self, key: i64) {
        self.cid = key;
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase", default)]
pub struct Exercise {
    pub eid: i64,
    /// Author.
    pub tid: i64,
    pub etitle: String,
    pub econtent: String,
}

sort_fields! {
    ExerciseSort {
        Eid => "eid",
        Tid => "tid",
        Etitle => "etitle",
    }
    natural = Eid
}

impl Record for Exercise {
    type Sort = ExerciseSort;
    const KIND: &'static str = "exercise";
    const TABLE: &'static str = "exercise";
    const KEY: &'static str = "eid";
    const COLUMNS: &'static [Column] = &[
        Column::new("eid", "bigint"),
        Column::new("tid", "bigint"),
        Column::new("etitle", "text"),
        Column::new("econtent", "text"),
    ];
    const UNIQUE: &'static [&'static str] = &[];
    const FILTERS: &'static [&'static str] = &["tid"];

    fn key(&self) -> i64 {
        self.eid
    }

    fn set_key(&mut self, key: i64) {
        self.eid = key;
    }
}

/// A student's request to book a teacher.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase", default)]
pub struct OrderTeacher {
    pub otid: i64,
    pub sid: i64,
    pub tid: i64,
    pub ottime: DateTime<Utc>,
    pub otremark: String,
}

sort_fields! {
    OrderTeacherSort {
        Otid => "otid",
        Ottime => "ottime",
        Sid => "sid",
        Tid => "tid",
    }
    natural = Otid
}

impl Record for OrderTeacher {
    type Sort = OrderTeacherSort;
    const KIND: &'static str = "order_teacher";
    const TABLE: &'static str = "order_teacher";
    const KEY: &'static str = "otid";
    const COLUMNS: &'static [Column] = &[
        Column::new("otid", "bigint"),
        Column::new("sid", "bigint"),
        Column::new("tid", "bigint"),
        Column::new("ottime", "timestamptz"),
        Column::new("otremark", "text"),
    ];
    const UNIQUE: &'static [&'static str] = &[];
    const FILTERS: &'static [&'static str] = &["sid", "tid"];

    fn key(&self) -> i64 {
        self.otid
    }

    fn set_key(&mut self, key: i64) {
        self.otid = key;
    }
}

/// A scheduled session where a student asks a teacher about an exercise.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase", default)]
pub struct AskQuestion {
    #[serde(rename = "AQid")]
    pub aqid: i64,
    pub sid: i64,
    pub tid: i64,
    pub eid: i64,
    #[serde(rename = "AQtime")]
    pub aqtime: DateTime<Utc>,
    #[serde(rename = "AQremark")]
    pub aqremark: String,
}

sort_fields! {
    AskQuestionSort {
        Aqid => "aqid",
        Aqtime => "aqtime",
        Sid => "sid",
        Tid => "tid",
        Eid => "eid",
    }
    natural = Aqid
}

impl Record for AskQuestion {
    type Sort = AskQuestionSort;
    const KIND: &'static str = "ask_question";
    const TABLE: &'static str = "ask_question";
    const KEY: &'static str = "aqid";
    const COLUMNS: &'static [Column] = &[
        Column::new("aqid", "bigint"),
        Column::new("sid", "bigint"),
        Column::new("tid", "bigint"),
        Column::new("eid", "bigint"),
        Column::new("aqtime", "timestamptz"),
        Column::new("aqremark", "text"),
    ];
    const UNIQUE: &'static [&'static str] = &[];
    const FILTERS: &'static [&'static str] = &["sid", "tid", "eid"];

    fn key(&self) -> i64 {
        self.aqid
    }

    fn set_key(&mut self, key: i64) {
        self.aqid = key;
    }

    fn field_name(column: &str) -> String {
        match column {
            "aqid" => "AQid".into(),
            "aqtime" => "AQtime".into(),
            "aqremark" => "AQremark".into(),
            other => to_pascal_case(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{from_columns, to_columns, SortField};

    #[test]
    fn serialized_fields_match_columns() {
        let student = Student {
            sid: 7,
            sname: "amy".into(),
            sgrade_name: "高一".into(),
            cid: Some(2),
            ..Student::default()
        };
        let cols = to_columns(&student).unwrap();
        for c in Student::COLUMNS {
            assert!(cols.contains_key(c.name), "missing column {}", c.name);
        }
        assert_eq!(cols.len(), Student::COLUMNS.len());
        let back: Student = from_columns(cols).unwrap();
        assert_eq!(back, student);
    }

    #[test]
    fn every_sort_column_is_a_table_column() {
        fn check<R: Record>() {
            for f in <R::Sort as SortField>::ALL {
                assert!(R::column(f.column()).is_some(), "{} has no column {}", R::KIND, f.column());
            }
            assert_eq!(<R::Sort as SortField>::NATURAL.column(), R::KEY);
            assert_eq!(R::COLUMNS[0].name, R::KEY);
        }
        check::<Student>();
        check::<Teacher>();
        check::<Admin>();
        check::<Campus>();
        check::<Exercise>();
        check::<OrderTeacher>();
        check::<AskQuestion>();
    }

    #[test]
    fn student_json_uses_pascal_case_names() {
        let s: Student = serde_json::from_str(r#"{"Sname":"zoe","SgradeName":"初二"}"#).unwrap();
        assert_eq!(s.sname, "zoe");
        assert_eq!(s.sgrade_name, "初二");
        assert_eq!(s.sid, 0);
        assert_eq!(s.cid, None);
    }

    #[test]
    fn ask_question_keeps_upper_aq_names() {
        let q: AskQuestion = serde_json::from_str(
            r#"{"AQid":4,"Sid":1,"Tid":2,"Eid":3,"AQtime":"2024-03-01T10:00:00Z","AQremark":"help"}"#,
        )
        .unwrap();
        assert_eq!(q.aqremark, "help");
        assert_eq!(q.aqtime.to_rfc3339(), "2024-03-01T10:00:00+00:00");

        let cols = to_columns(&q).unwrap();
        for c in AskQuestion::COLUMNS {
            assert!(cols.contains_key(c.name), "missing column {}", c.name);
        }
        let back: AskQuestion = from_columns(cols).unwrap();
        assert_eq!(back, q);

        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["AQremark"], "help");
        assert!(json.get("Aqremark").is_none());
    }

    #[test]
    fn ask_question_sorts_by_either_spelling() {
        assert_eq!(AskQuestionSort::parse("AQtime"), Some(AskQuestionSort::Aqtime));
        assert_eq!(AskQuestionSort::parse("aqtime"), Some(AskQuestionSort::Aqtime));
        assert_eq!(StudentSort::parse("SgradeName"), None);
        assert_eq!(StudentSort::parse("Sgrade"), Some(StudentSort::Sgrade));
    }
}
