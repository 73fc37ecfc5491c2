//! Document metadata printed on the first page by the sharing platform.

use serde::{Deserialize, Serialize};

/// Course information found on the first page of a shared document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    /// File name as uploaded ("Archivo")
    pub file: Option<String>,

    /// Uploader ("Autor")
    pub author: Option<String>,

    /// Subject ("Asignatura")
    pub subject: Option<String>,

    /// Course and degree ("Curso y Grado")
    pub course: Option<String>,

    /// Faculty ("Facultad")
    pub faculty: Option<String>,

    /// University ("Universidad")
    pub university: Option<String>,
}

impl DocumentMetadata {
    /// Labels used by the platform, in first-page line order.
    pub const LABELS: [&'static str; 6] = [
        "Archivo",
        "Autor",
        "Asignatura",
        "Curso y Grado",
        "Facultad",
        "Universidad",
    ];

    /// Fields paired with their labels, in first-page line order.
    pub fn entries(&self) -> [(&'static str, Option<&str>); 6] {
        [
            (Self::LABELS[0], self.file.as_deref()),
            (Self::LABELS[1], self.author.as_deref()),
            (Self::LABELS[2], self.subject.as_deref()),
            (Self::LABELS[3], self.course.as_deref()),
            (Self::LABELS[4], self.faculty.as_deref()),
            (Self::LABELS[5], self.university.as_deref()),
        ]
    }

    /// Whether no field is set.
    pub fn is_empty(&self) -> bool {
        self.entries().iter().all(|(_, value)| value.is_none())
    }
}
