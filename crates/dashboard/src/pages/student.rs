use std::sync::Arc;

use client::SchoolClient;
use shared_types::{
    attendance_rate, letter_grade, unread_count, AppError, Feedback, RealtimeEvent,
    SubmissionUpload, UploadFile,
};

use super::present_error;
use crate::controller::{Controller, Page};
use crate::modal::{Modal, ModalKind};
use crate::render::{
    format_date, format_date_str, format_percent, format_score, title_case, Card, Content, Stat,
    Table,
};
use crate::tabs::TabKind;
use crate::view::View;

pub const SUBMIT_MODAL: &str = "submit-assignment";
pub const FEEDBACK_MODAL: &str = "feedback";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentTab {
    Dashboard,
    Classes,
    Assignments,
    Grades,
    Attendance,
    Notifications,
}

impl TabKind for StudentTab {
    const ALL: &'static [Self] = &[
        StudentTab::Dashboard,
        StudentTab::Classes,
        StudentTab::Assignments,
        StudentTab::Grades,
        StudentTab::Attendance,
        StudentTab::Notifications,
    ];

    fn id(&self) -> &'static str {
        match self {
            StudentTab::Dashboard => "dashboard",
            StudentTab::Classes => "classes",
            StudentTab::Assignments => "assignments",
            StudentTab::Grades => "grades",
            StudentTab::Attendance => "attendance",
            StudentTab::Notifications => "notifications",
        }
    }

    fn default_tab() -> Self {
        StudentTab::Dashboard
    }
}

pub struct StudentPage {
    client: SchoolClient,
}

impl StudentPage {
    pub fn new(client: SchoolClient) -> Self {
        Self { client }
    }

    async fn load_dashboard(&self) -> Result<Content, AppError> {
        let summary = self.client.student().dashboard().await?;
        Ok(Content::Stats(vec![
            Stat::new("Classes", summary.total_classes),
            Stat::new("Pending Assignments", summary.pending_assignments),
            Stat::new("Average Grade", format_percent(summary.average_grade)),
            Stat::new("Attendance", format_percent(summary.attendance_rate)),
        ]))
    }

    async fn load_classes(&self) -> Content {
        let classes = self.client.student().classes().await;
        Content::Cards(
            classes
                .iter()
                .map(|class| {
                    let teacher = class
                        .teacher
                        .as_ref()
                        .map(|t| t.full_name.clone())
                        .unwrap_or_else(|| "TBA".into());
                    Card::new(&class.name)
                        .subtitle(class.subject.clone())
                        .line(format!("Teacher: {teacher}"))
                        .line(class.room.clone().unwrap_or_else(|| "Room TBA".into()))
                })
                .collect(),
        )
    }

    async fn load_assignments(&self) -> Content {
        let today = self.client.clock().today();
        let assignments = self.client.student().assignments(None).await;
        let rows = assignments.iter().map(|a| {
            let status = if a.is_overdue(today) && a.status == "pending" {
                "Overdue".to_string()
            } else {
                title_case(&a.status)
            };
            vec![a.title.clone(), format_date(a.due_date), a.max_score.to_string(), status]
        });
        Content::Table(Table::new(&["Title", "Due", "Max Score", "Status"]).rows(rows))
    }

    async fn load_grades(&self) -> Content {
        let grades = self.client.student().grades().await;
        let rows = grades.iter().map(|g| {
            vec![
                g.class_id.to_string(),
                title_case(&g.grade_type),
                format_score(g.score, g.max_score),
                g.percent().map(letter_grade).unwrap_or("-").to_string(),
            ]
        });
        Content::Table(Table::new(&["Class", "Type", "Score", "Grade"]).rows(rows))
    }

    async fn load_attendance(&self) -> Content {
        let records = self.client.student().attendance().await;
        if records.is_empty() {
            return Content::Table(Table::default());
        }
        let rate = attendance_rate(&records)
            .map(format_percent)
            .unwrap_or_else(|| "-".into());
        let table = Table::new(&["Date", "Class", "Status"])
            .rows(records.iter().map(|r| {
                vec![format_date(r.date), r.class_id.to_string(), r.status.to_string()]
            }))
            .row(vec!["Overall".into(), String::new(), rate]);
        Content::Table(table)
    }

    async fn load_notifications(&self) -> Content {
        let notifications = self.client.student().notifications().await;
        let unread = unread_count(&notifications);
        tracing::debug!(unread, "notifications loaded");
        Content::Cards(
            notifications
                .iter()
                .map(|n| {
                    let card = Card::new(&n.title)
                        .subtitle(format_date_str(n.created_at.as_deref()))
                        .line(n.message.clone());
                    if n.read {
                        card
                    } else {
                        card.badge("New")
                    }
                })
                .collect(),
        )
    }
}

impl Page for StudentPage {
    type Tab = StudentTab;

    fn name(&self) -> &'static str {
        "student"
    }

    async fn load(&self, tab: StudentTab) -> Result<Content, AppError> {
        match tab {
            StudentTab::Dashboard => self.load_dashboard().await,
            StudentTab::Classes => Ok(self.load_classes().await),
            StudentTab::Assignments => Ok(self.load_assignments().await),
            StudentTab::Grades => Ok(self.load_grades().await),
            StudentTab::Attendance => Ok(self.load_attendance().await),
            StudentTab::Notifications => Ok(self.load_notifications().await),
        }
    }

    fn empty_message(&self, tab: StudentTab) -> &'static str {
        match tab {
            StudentTab::Dashboard => "No summary available",
            StudentTab::Classes => "You are not enrolled in any classes",
            StudentTab::Assignments => "No assignments",
            StudentTab::Grades => "No grades yet",
            StudentTab::Attendance => "No attendance records",
            StudentTab::Notifications => "No notifications",
        }
    }

    fn is_related(&self, tab: StudentTab, event: &RealtimeEvent) -> bool {
        match event {
            RealtimeEvent::GradeUpdate(_) => {
                matches!(tab, StudentTab::Grades | StudentTab::Dashboard)
            }
            RealtimeEvent::AttendanceUpdate(_) => {
                matches!(tab, StudentTab::Attendance | StudentTab::Dashboard)
            }
            RealtimeEvent::AssignmentSubmission(_) => {
                matches!(tab, StudentTab::Assignments | StudentTab::Dashboard)
            }
            RealtimeEvent::MessageReceived(_) => tab == StudentTab::Notifications,
        }
    }
}

/// Student dashboard: tabs plus assignment submission and feedback.
pub struct StudentDashboard {
    client: SchoolClient,
    controller: Controller<StudentPage>,
    submit_modal: Modal,
    feedback_modal: Modal,
}

impl StudentDashboard {
    pub fn new(client: SchoolClient, view: Arc<dyn View>, query: Option<&str>) -> Self {
        let page = StudentPage::new(client.clone());
        let controller = Controller::new(page, view, Arc::clone(client.notifier()), query);
        Self {
            client,
            controller,
            submit_modal: Modal::new(SUBMIT_MODAL, ModalKind::Add),
            feedback_modal: Modal::new(FEEDBACK_MODAL, ModalKind::Add),
        }
    }

    pub fn controller(&self) -> &Controller<StudentPage> {
        &self.controller
    }

    pub fn submit_modal(&self) -> &Modal {
        &self.submit_modal
    }

    pub fn feedback_modal(&self) -> &Modal {
        &self.feedback_modal
    }

    fn view(&self) -> &dyn View {
        self.controller.view().as_ref()
    }

    pub fn open_submit(&self, assignment_id: i64) {
        self.submit_modal.open(self.view());
        self.submit_modal
            .set(self.view(), "assignment_id", assignment_id.to_string());
    }

    /// Upload the submission typed into the modal, with an optional file.
    #[tracing::instrument(skip(self, file))]
    pub async fn submit_assignment(&self, file: Option<UploadFile>) -> Result<(), AppError> {
        let form = self.submit_modal.form();
        let result = match form.number::<i64>("assignment_id", "No assignment selected") {
            Ok(assignment_id) => {
                let upload = SubmissionUpload {
                    content: form.text("content"),
                    file,
                };
                self.client
                    .student()
                    .submit_assignment(assignment_id, upload)
                    .await
            }
            Err(err) => Err(err),
        };
        match result {
            Ok(receipt) => {
                tracing::info!(submission_id = ?receipt.submission_id, "assignment submitted");
                let message = if receipt.message.is_empty() {
                    "Assignment submitted successfully".to_string()
                } else {
                    receipt.message
                };
                self.client.notifier().success(&message);
                self.submit_modal.close(self.view());
                if self.controller.current_tab() == StudentTab::Assignments {
                    self.controller.refresh().await;
                }
                Ok(())
            }
            Err(err) => {
                self.submit_modal.show_errors(self.view(), &err);
                present_error(self.client.notifier().as_ref(), &err);
                Err(err)
            }
        }
    }

    pub async fn send_feedback(&self) -> Result<(), AppError> {
        let form = self.feedback_modal.form();
        let rating = match form.optional("rating") {
            Some(_) => match form.number::<u8>("rating", "Rating is required") {
                Ok(rating) => Some(rating),
                Err(err) => {
                    self.feedback_modal.show_errors(self.view(), &err);
                    present_error(self.client.notifier().as_ref(), &err);
                    return Err(err);
                }
            },
            None => None,
        };
        let feedback = Feedback {
            subject: form.text("subject"),
            message: form.text("message"),
            rating,
        };
        match self.client.student().send_feedback(&feedback).await {
            Ok(_) => {
                self.client.notifier().success("Thank you for your feedback");
                self.feedback_modal.close(self.view());
                Ok(())
            }
            Err(err) => {
                self.feedback_modal.show_errors(self.view(), &err);
                present_error(self.client.notifier().as_ref(), &err);
                Err(err)
            }
        }
    }

    /// Mark a notification read and redraw the list when it is showing.
    pub async fn mark_notification_read(&self, notification_id: i64) -> Result<(), AppError> {
        self.client
            .student()
            .mark_notification_read(notification_id)
            .await?;
        if self.controller.current_tab() == StudentTab::Notifications {
            self.controller.refresh().await;
        }
        Ok(())
    }
}
