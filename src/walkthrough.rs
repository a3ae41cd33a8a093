//! The scripted student-information demo.
//!
//! Builds the `studentInfoDB` table, fills in three students with their
//! course selections, queries it, adds contact e-mails, removes one
//! student's course data and finally drops the table.
use std::io::Write;

use crate::{session::Session, util::Result};

pub const TABLE_NAME: &str = "studentInfoDB";
pub const FAMILIES: [&str; 4] = ["S_info", "C_1", "C_2", "C_3"];
pub const CONTACT_FAMILY: &str = "Contact";

/// (row, family, qualifier, value)
pub type CellSpec = (&'static str, &'static str, &'static str, &'static str);

pub const STUDENT_INFO: &[CellSpec] = &[
    ("2015001", "S_info", "S_Name", "Li Lei"),
    ("2015001", "S_info", "S_Sex", "male"),
    ("2015001", "S_info", "S_Age", "23"),
    ("2015002", "S_info", "S_Name", "Han Meimei"),
    ("2015002", "S_info", "S_Sex", "female"),
    ("2015002", "S_info", "S_Age", "22"),
    ("2015003", "S_info", "S_Name", "Li Lei"),
    ("2015003", "S_info", "S_Sex", "male"),
    ("2015003", "S_info", "S_Age", "24"),
];

pub const COURSE_SELECTIONS: &[CellSpec] = &[
    ("2015001", "C_1", "SC_Cno", "123001"),
    ("2015001", "C_1", "C_Name", "Math"),
    ("2015001", "C_1", "C_Credit", "2.0"),
    ("2015001", "C_1", "SC_Score", "86"),
    ("2015001", "C_3", "SC_Cno", "123003"),
    ("2015001", "C_3", "C_Name", "English"),
    ("2015001", "C_3", "C_Credit", "3.0"),
    ("2015001", "C_3", "SC_Score", "69"),
    ("2015002", "C_2", "SC_Cno", "123002"),
    ("2015002", "C_2", "C_Name", "Computer Science"),
    ("2015002", "C_2", "C_Credit", "5.0"),
    ("2015002", "C_2", "SC_Score", "77"),
    ("2015002", "C_3", "SC_Cno", "123003"),
    ("2015002", "C_3", "C_Name", "English"),
    ("2015002", "C_3", "C_Credit", "3.0"),
    ("2015002", "C_3", "SC_Score", "99"),
    ("2015003", "C_1", "SC_Cno", "123001"),
    ("2015003", "C_1", "C_Name", "Math"),
    ("2015003", "C_1", "C_Credit", "2.0"),
    ("2015003", "C_1", "SC_Score", "98"),
    ("2015003", "C_2", "SC_Cno", "123002"),
    ("2015003", "C_2", "C_Name", "Computer Science"),
    ("2015003", "C_2", "C_Credit", "5.0"),
    ("2015003", "C_2", "SC_Score", "95"),
];

pub const CONTACT_EMAILS: &[CellSpec] = &[
    ("2015001", "Contact", "Email", "lilei@qq.com"),
    ("2015002", "Contact", "Email", "hmm@qq.com"),
    ("2015003", "Contact", "Email", "zs@qq.com"),
];

/// The student whose course selections are removed in step 4.
pub const WITHDRAWN_STUDENT: &str = "2015003";
pub const COURSE_FAMILIES: [&str; 3] = ["C_1", "C_2", "C_3"];
pub const COURSE_QUALIFIERS: [&str; 4] = ["SC_Cno", "C_Name", "C_Credit", "SC_Score"];

fn step<W: Write>(session: &mut Session<W>, title: &str) -> Result<()> {
    writeln!(session.output_mut(), "\n-------{title} -------")?;
    Ok(())
}

fn insert_all<W: Write>(session: &mut Session<W>, cells: &[CellSpec]) -> Result<()> {
    for (row, family, qualifier, value) in cells {
        session.insert_data(TABLE_NAME, row, family, qualifier, value)?;
    }
    Ok(())
}

/// Run every step of the demo against `session`. Stops at the first failed
/// operation; the caller still owns (and closes) the session.
pub fn run<W: Write>(session: &mut Session<W>) -> Result<()> {
    step(session, "[1] Create table: studentInfoDB")?;
    session.create_table(TABLE_NAME, &FAMILIES)?;
    insert_all(session, STUDENT_INFO)?;
    insert_all(session, COURSE_SELECTIONS)?;

    step(session, "[1result] Scan Table Just Created")?;
    session.show_table(TABLE_NAME)?;

    step(session, "[2] Query the score of students select course Computer Science")?;
    session.show_column(TABLE_NAME, "C_2", "SC_Score")?;

    step(session, "[3] Add Contact:Email")?;
    session.add_family(TABLE_NAME, CONTACT_FAMILY)?;
    insert_all(session, CONTACT_EMAILS)?;

    step(session, "[3result] Scan Contact:Email Just Modified")?;
    session.show_column(TABLE_NAME, CONTACT_FAMILY, "Email")?;

    step(session, "[4] Delete Student 2015003 Course Select Information")?;
    for family in COURSE_FAMILIES {
        for qualifier in COURSE_QUALIFIERS {
            session.delete_by_cell(TABLE_NAME, WITHDRAWN_STUDENT, family, qualifier)?;
        }
    }

    step(session, "[4result] Scan Table Just Modified")?;
    session.show_table(TABLE_NAME)?;

    step(session, "[5] Drop table studentInfoDB")?;
    session.list_tables()?;
    session.drop_table(TABLE_NAME)?;
    session.list_tables()?;

    Ok(())
}
