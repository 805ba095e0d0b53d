//! Curriculum continuation printed on page 2 of the transcript.
//!
//! The second page is a fixed listing of the remaining terms of the
//! student's program, not data pulled from the records service. Programs
//! without an entry get a generic "not on file" page.

pub struct CurriculumSubject {
    pub code: &'static str,
    pub title: &'static str,
    pub units: u32,
}

pub struct CurriculumTerm {
    pub year_level: &'static str,
    pub semester: &'static str,
    pub subjects: &'static [CurriculumSubject],
}

impl CurriculumTerm {
    pub fn total_units(&self) -> u32 {
        self.subjects.iter().map(|s| s.units).sum()
    }
}

pub struct Curriculum {
    pub program: &'static str,
    pub terms: &'static [CurriculumTerm],
}

macro_rules! subject {
    ($code:expr, $title:expr, $units:expr) => {
        CurriculumSubject {
            code: $code,
            title: $title,
            units: $units,
        }
    };
}

static BSIT: Curriculum = Curriculum {
    program: "Bachelor of Science in Information Technology",
    terms: &[
        CurriculumTerm {
            year_level: "Third Year",
            semester: "First Semester",
            subjects: &[
                subject!("IT301", "Integrative Programming and Technologies", 3),
                subject!("IT302", "Systems Integration and Architecture", 3),
                subject!("IT303", "Information Management 2", 3),
                subject!("IT304", "Quantitative Methods", 3),
                subject!("GE7", "Science, Technology and Society", 3),
            ],
        },
        CurriculumTerm {
            year_level: "Third Year",
            semester: "Second Semester",
            subjects: &[
                subject!("IT305", "Information Assurance and Security 1", 3),
                subject!("IT306", "Application Development and Emerging Technologies", 5),
                subject!("IT307", "Social and Professional Issues", 3),
                subject!("GE8", "Ethics", 3),
            ],
        },
        CurriculumTerm {
            year_level: "Fourth Year",
            semester: "First Semester",
            subjects: &[
                subject!("IT401", "Capstone Project and Research 1", 3),
                subject!("IT402", "Information Assurance and Security 2", 3),
                subject!("IT403", "Systems Administration and Maintenance", 3),
            ],
        },
        CurriculumTerm {
            year_level: "Fourth Year",
            semester: "Second Semester",
            subjects: &[
                subject!("IT404", "Capstone Project and Research 2", 3),
                subject!("IT405", "Practicum (486 hours)", 6),
            ],
        },
    ],
};

static BSCS: Curriculum = Curriculum {
    program: "Bachelor of Science in Computer Science",
    terms: &[
        CurriculumTerm {
            year_level: "Third Year",
            semester: "First Semester",
            subjects: &[
                subject!("CS301", "Automata Theory and Formal Languages", 3),
                subject!("CS302", "Programming Languages", 3),
                subject!("CS303", "Software Engineering 1", 3),
                subject!("CS304", "Operating Systems", 3),
            ],
        },
        CurriculumTerm {
            year_level: "Third Year",
            semester: "Second Semester",
            subjects: &[
                subject!("CS305", "Software Engineering 2", 3),
                subject!("CS306", "Computer Networks", 3),
                subject!("CS307", "Intelligent Systems", 3),
                subject!("CS308", "Human Computer Interaction", 3),
            ],
        },
        CurriculumTerm {
            year_level: "Fourth Year",
            semester: "First Semester",
            subjects: &[
                subject!("CS401", "CS Thesis Writing 1", 3),
                subject!("CS402", "Parallel and Distributed Computing", 3),
                subject!("CS403", "Information Assurance and Security", 3),
            ],
        },
        CurriculumTerm {
            year_level: "Fourth Year",
            semester: "Second Semester",
            subjects: &[
                subject!("CS404", "CS Thesis Writing 2", 3),
                subject!("CS405", "Social Issues and Professional Practice", 3),
            ],
        },
    ],
};

static BSBA: Curriculum = Curriculum {
    program: "Bachelor of Science in Business Administration",
    terms: &[
        CurriculumTerm {
            year_level: "Third Year",
            semester: "First Semester",
            subjects: &[
                subject!("BA301", "Operations Management and TQM", 3),
                subject!("BA302", "Business Research", 3),
                subject!("BA303", "Strategic Management", 3),
                subject!("BA304", "Income Taxation", 3),
            ],
        },
        CurriculumTerm {
            year_level: "Third Year",
            semester: "Second Semester",
            subjects: &[
                subject!("BA305", "Feasibility Study", 3),
                subject!("BA306", "International Business and Trade", 3),
                subject!("BA307", "Good Governance and Social Responsibility", 3),
            ],
        },
        CurriculumTerm {
            year_level: "Fourth Year",
            semester: "First Semester",
            subjects: &[
                subject!("BA401", "Thesis or Feasibility Study 2", 3),
                subject!("BA402", "Entrepreneurial Management", 3),
            ],
        },
        CurriculumTerm {
            year_level: "Fourth Year",
            semester: "Second Semester",
            subjects: &[subject!("BA403", "Practicum (600 hours)", 6)],
        },
    ],
};

/// Look up the curriculum for a program name or its abbreviation.
pub fn for_program(course: &str) -> Option<&'static Curriculum> {
    let normalized = course
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase();

    let matches = |abbreviation: &str, name: &str| {
        normalized == abbreviation
            || normalized.starts_with(&format!("{} ", abbreviation))
            || normalized.contains(name)
    };

    if matches("BSIT", "INFORMATION TECHNOLOGY") {
        Some(&BSIT)
    } else if matches("BSCS", "COMPUTER SCIENCE") {
        Some(&BSCS)
    } else if matches("BSBA", "BUSINESS ADMINISTRATION") {
        Some(&BSBA)
    } else {
        None
    }
}
