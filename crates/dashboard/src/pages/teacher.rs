use std::sync::Arc;

use client::SchoolClient;
use parking_lot::Mutex;
use shared_types::{
    letter_grade, AppError, AttendanceEntry, AttendanceStatus, GradeEntry, NewAssignment,
    RealtimeEvent, DEFAULT_MAX_SCORE,
};

use super::present_error;
use crate::controller::{Controller, LoadOutcome, Page};
use crate::modal::{FormState, Modal, ModalKind};
use crate::render::{
    format_date, format_percent, format_score, title_case, Card, Content, Stat, Table,
};
use crate::tabs::TabKind;
use crate::view::View;

pub const ASSIGNMENT_MODAL: &str = "create-assignment";
pub const GRADE_FORM: &str = "grade-entry";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TeacherTab {
    Dashboard,
    Classes,
    Assignments,
    Grades,
    Attendance,
}

impl TabKind for TeacherTab {
    const ALL: &'static [Self] = &[
        TeacherTab::Dashboard,
        TeacherTab::Classes,
        TeacherTab::Assignments,
        TeacherTab::Grades,
        TeacherTab::Attendance,
    ];

    fn id(&self) -> &'static str {
        match self {
            TeacherTab::Dashboard => "dashboard",
            TeacherTab::Classes => "classes",
            TeacherTab::Assignments => "assignments",
            TeacherTab::Grades => "grades",
            TeacherTab::Attendance => "attendance",
        }
    }

    fn default_tab() -> Self {
        TeacherTab::Dashboard
    }
}

/// Tab loaders for the teacher dashboard.
pub struct TeacherPage {
    client: SchoolClient,
    /// Class shown on the grades and attendance tabs; the first class
    /// when none was picked.
    selected_class: Mutex<Option<i64>>,
}

impl TeacherPage {
    pub fn new(client: SchoolClient) -> Self {
        Self {
            client,
            selected_class: Mutex::new(None),
        }
    }

    pub fn select_class(&self, class_id: i64) {
        *self.selected_class.lock() = Some(class_id);
    }

    async fn class_in_focus(&self) -> Option<i64> {
        let selected = *self.selected_class.lock();
        match selected {
            Some(id) => Some(id),
            None => self.client.teacher().classes().await.first().map(|c| c.id),
        }
    }

    async fn load_dashboard(&self) -> Result<Content, AppError> {
        let stats = self.client.teacher().dashboard_stats().await?;
        Ok(Content::Stats(vec![
            Stat::new("Students", stats.total_students),
            Stat::new("Classes", stats.total_classes),
            Stat::new("Active Assignments", stats.active_assignments),
            Stat::new("Attendance", format_percent(stats.average_attendance)),
            Stat::new("Recent Submissions", stats.recent_submissions),
            Stat::new("Average Grade", format_percent(stats.average_grade)),
        ]))
    }

    async fn load_classes(&self) -> Content {
        let classes = self.client.teacher().classes().await;
        Content::Cards(
            classes
                .iter()
                .map(|class| {
                    Card::new(&class.name)
                        .subtitle(format!("{} - {}", class.subject, class.grade_section()))
                        .line(format!("{} students", class.current_students))
                        .line(class.schedule.clone().unwrap_or_else(|| "No schedule".into()))
                        .badge(title_case(&class.status))
                })
                .collect(),
        )
    }

    async fn load_assignments(&self) -> Content {
        let today = self.client.clock().today();
        let assignments = self.client.teacher().assignments().await;
        let rows = assignments.iter().map(|a| {
            let submitted = a
                .submission_stats
                .as_ref()
                .map(|s| format!("{}/{}", s.graded_submissions, s.total_submissions))
                .unwrap_or_else(|| "-".into());
            let status = if a.is_overdue(today) {
                "Overdue".to_string()
            } else {
                title_case(&a.status)
            };
            vec![
                a.title.clone(),
                a.class_id.to_string(),
                format_date(a.due_date),
                a.max_score.to_string(),
                submitted,
                status,
            ]
        });
        Content::Table(
            Table::new(&["Title", "Class", "Due", "Max Score", "Graded", "Status"]).rows(rows),
        )
    }

    async fn load_grades(&self) -> Content {
        let Some(class_id) = self.class_in_focus().await else {
            return Content::Table(Table::default());
        };
        let grades = self.client.teacher().class_grades(class_id, None).await;
        let rows = grades.iter().map(|g| {
            let letter = g.percent().map(letter_grade).unwrap_or("-");
            vec![
                g.student_name.clone(),
                format_score(g.score, g.max_score),
                letter.to_string(),
                title_case(&g.status),
            ]
        });
        Content::Table(Table::new(&["Student", "Score", "Grade", "Status"]).rows(rows))
    }

    async fn load_attendance(&self) -> Content {
        let Some(class_id) = self.class_in_focus().await else {
            return Content::Table(Table::default());
        };
        let today = self.client.clock().today();
        let records = self.client.teacher().attendance(class_id, today).await;
        let rows = records.iter().map(|r| {
            vec![
                r.student_name
                    .clone()
                    .unwrap_or_else(|| format!("Student {}", r.student_id)),
                r.status.to_string(),
                r.notes.clone().unwrap_or_default(),
            ]
        });
        Content::Table(Table::new(&["Student", "Status", "Notes"]).rows(rows))
    }
}

impl Page for TeacherPage {
    type Tab = TeacherTab;

    fn name(&self) -> &'static str {
        "teacher"
    }

    async fn load(&self, tab: TeacherTab) -> Result<Content, AppError> {
        match tab {
            TeacherTab::Dashboard => self.load_dashboard().await,
            TeacherTab::Classes => Ok(self.load_classes().await),
            TeacherTab::Assignments => Ok(self.load_assignments().await),
            TeacherTab::Grades => Ok(self.load_grades().await),
            TeacherTab::Attendance => Ok(self.load_attendance().await),
        }
    }

    fn empty_message(&self, tab: TeacherTab) -> &'static str {
        match tab {
            TeacherTab::Dashboard => "No statistics available",
            TeacherTab::Classes => "You have no classes assigned",
            TeacherTab::Assignments => "No assignments yet",
            TeacherTab::Grades => "No grades recorded",
            TeacherTab::Attendance => "No attendance taken today",
        }
    }

    fn is_related(&self, tab: TeacherTab, event: &RealtimeEvent) -> bool {
        match event {
            RealtimeEvent::AttendanceUpdate(_) => {
                matches!(tab, TeacherTab::Attendance | TeacherTab::Dashboard)
            }
            RealtimeEvent::GradeUpdate(_) => {
                matches!(tab, TeacherTab::Grades | TeacherTab::Dashboard)
            }
            RealtimeEvent::AssignmentSubmission(_) => {
                matches!(tab, TeacherTab::Assignments | TeacherTab::Dashboard)
            }
            RealtimeEvent::MessageReceived(_) => false,
        }
    }

    fn on_event(&self, event: &RealtimeEvent) {
        if !matches!(event, RealtimeEvent::MessageReceived(_)) {
            self.client.teacher().invalidate_dashboard_stats();
        }
    }
}

/// Teacher dashboard: tab controller plus the create-assignment, grading
/// and attendance flows.
pub struct TeacherDashboard {
    client: SchoolClient,
    controller: Controller<TeacherPage>,
    assignment_modal: Modal,
}

impl TeacherDashboard {
    pub fn new(client: SchoolClient, view: Arc<dyn View>, query: Option<&str>) -> Self {
        let page = TeacherPage::new(client.clone());
        let controller = Controller::new(page, view, Arc::clone(client.notifier()), query);
        Self {
            client,
            controller,
            assignment_modal: Modal::new(ASSIGNMENT_MODAL, ModalKind::Add),
        }
    }

    pub fn controller(&self) -> &Controller<TeacherPage> {
        &self.controller
    }

    pub fn assignment_modal(&self) -> &Modal {
        &self.assignment_modal
    }

    fn view(&self) -> &dyn View {
        self.controller.view().as_ref()
    }

    pub fn open_create_assignment(&self) {
        self.assignment_modal.open(self.view());
    }

    /// Submit the create-assignment form. Invalid input stays in the modal
    /// with the offending fields decorated and never reaches the server.
    #[tracing::instrument(skip(self))]
    pub async fn submit_create_assignment(&self) -> Result<(), AppError> {
        let result = match assignment_from_form(&self.assignment_modal.form()) {
            Ok(assignment) => self.client.teacher().create_assignment(&assignment).await,
            Err(err) => Err(err),
        };

        match result {
            Ok(created) => {
                tracing::info!(assignment_id = created.id, "assignment created");
                self.client.notifier().success("Assignment created successfully");
                self.assignment_modal.close(self.view());
                self.controller.activate(TeacherTab::Assignments).await;
                Ok(())
            }
            Err(err) => {
                self.present_form_error(&self.assignment_modal, &err);
                Err(err)
            }
        }
    }

    fn present_form_error(&self, modal: &Modal, err: &AppError) {
        modal.show_errors(self.view(), err);
        present_error(self.client.notifier().as_ref(), err);
    }

    /// Which class the grades and attendance tabs show.
    pub async fn select_class(&self, class_id: i64) -> Option<LoadOutcome> {
        self.controller.page().select_class(class_id);
        match self.controller.current_tab() {
            TeacherTab::Grades | TeacherTab::Attendance => Some(self.controller.refresh().await),
            _ => None,
        }
    }

    /// Grade one student's work. `score` is the raw text from the input.
    #[tracing::instrument(skip(self, comment))]
    pub async fn record_grade(
        &self,
        class_id: i64,
        assignment_id: i64,
        student_id: i64,
        score: &str,
        comment: &str,
    ) -> Result<(), AppError> {
        let view = self.view();
        view.clear_field_errors(GRADE_FORM);
        let result = match parse_score(score) {
            Ok(score) => {
                let entry = GradeEntry::new(class_id, assignment_id, student_id, score)
                    .with_comment(comment);
                self.client.teacher().record_grade(&entry).await.map(|_| ())
            }
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => {
                self.client.notifier().success("Grade saved successfully");
                self.refresh_if(TeacherTab::Grades).await;
                Ok(())
            }
            Err(err) => {
                for (field, message) in &err.field_errors {
                    view.set_field_error(GRADE_FORM, field, message);
                }
                present_error(self.client.notifier().as_ref(), &err);
                Err(err)
            }
        }
    }

    /// Submit today's marks for a class.
    pub async fn mark_attendance(
        &self,
        class_id: i64,
        marks: &[(i64, AttendanceStatus)],
    ) -> Result<(), AppError> {
        let date = self.client.clock().today();
        let entries: Vec<AttendanceEntry> = marks
            .iter()
            .map(|(student_id, status)| AttendanceEntry {
                class_id,
                student_id: *student_id,
                date,
                status: *status,
                notes: None,
            })
            .collect();
        match self.client.teacher().mark_attendance(&entries).await {
            Ok(_) => {
                self.client.notifier().success("Attendance saved successfully");
                self.refresh_if(TeacherTab::Attendance).await;
                Ok(())
            }
            Err(err) => {
                present_error(self.client.notifier().as_ref(), &err);
                Err(err)
            }
        }
    }

    async fn refresh_if(&self, tab: TeacherTab) -> Option<LoadOutcome> {
        if self.controller.current_tab() == tab {
            Some(self.controller.refresh().await)
        } else {
            None
        }
    }
}

fn assignment_from_form(form: &FormState) -> Result<NewAssignment, AppError> {
    let max_score = match form.optional("max_score") {
        Some(_) => form.number("max_score", "Max score is required")?,
        None => DEFAULT_MAX_SCORE,
    };
    Ok(NewAssignment {
        title: form.required("title", "Title")?,
        description: form.text("description"),
        class_id: form.number("class_id", "Please select a class")?,
        due_date: form.date("due_date", "Due date is required")?,
        max_score,
    })
}

fn parse_score(raw: &str) -> Result<f64, AppError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AppError::field("score", "Score is required"));
    }
    raw.parse()
        .map_err(|_| AppError::field("score", "Score must be a number"))
}
