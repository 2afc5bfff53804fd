use std::sync::Arc;

use client::SchoolClient;
use parking_lot::Mutex;
use shared_types::{letter_grade, outstanding_total, AppError, NewMessage, RealtimeEvent};

use super::present_error;
use crate::controller::{Controller, Page};
use crate::modal::{FormState, Modal, ModalKind};
use crate::render::{
    format_date_str, format_money, format_percent, format_score, title_case, Card, Content, Table,
};
use crate::tabs::TabKind;
use crate::view::View;

pub const MESSAGE_MODAL: &str = "new-message";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentTab {
    Dashboard,
    Grades,
    Announcements,
    Fees,
    Messages,
}

impl TabKind for ParentTab {
    const ALL: &'static [Self] = &[
        ParentTab::Dashboard,
        ParentTab::Grades,
        ParentTab::Announcements,
        ParentTab::Fees,
        ParentTab::Messages,
    ];

    fn id(&self) -> &'static str {
        match self {
            ParentTab::Dashboard => "dashboard",
            ParentTab::Grades => "grades",
            ParentTab::Announcements => "announcements",
            ParentTab::Fees => "fees",
            ParentTab::Messages => "messages",
        }
    }

    fn default_tab() -> Self {
        ParentTab::Dashboard
    }
}

pub struct ParentPage {
    client: SchoolClient,
    selected_child: Mutex<Option<i64>>,
}

impl ParentPage {
    pub fn new(client: SchoolClient) -> Self {
        Self {
            client,
            selected_child: Mutex::new(None),
        }
    }

    pub fn select_child(&self, child_id: i64) {
        *self.selected_child.lock() = Some(child_id);
    }

    async fn load_children(&self) -> Content {
        let children = self.client.parent().children().await;
        Content::Cards(
            children
                .iter()
                .map(|child| {
                    let class = match (&child.grade, &child.section) {
                        (Some(g), Some(s)) => format!("Grade {g} - Section {s}"),
                        (Some(g), None) => format!("Grade {g}"),
                        _ => "Not assigned".to_string(),
                    };
                    Card::new(&child.full_name)
                        .subtitle(class)
                        .line(format!("Attendance: {}", format_percent(child.attendance_rate)))
                        .line(format!("Average: {}", format_percent(child.average_grade)))
                })
                .collect(),
        )
    }

    async fn load_grades(&self) -> Result<Content, AppError> {
        let selected = *self.selected_child.lock();
        let child_id = match selected {
            Some(id) => id,
            None => match self.client.parent().children().await.first() {
                Some(child) => child.id,
                None => return Ok(Content::Table(Table::default())),
            },
        };
        let grades = self.client.parent().child_grades(child_id).await?;
        let rows = grades.iter().map(|g| {
            vec![
                g.class_id.to_string(),
                title_case(&g.grade_type),
                format_score(g.score, g.max_score),
                g.percent().map(letter_grade).unwrap_or("-").to_string(),
            ]
        });
        Ok(Content::Table(
            Table::new(&["Class", "Type", "Score", "Grade"]).rows(rows),
        ))
    }

    async fn load_announcements(&self) -> Content {
        let announcements = self.client.parent().announcements().await;
        Content::Cards(
            announcements
                .iter()
                .map(|a| {
                    let card = Card::new(&a.title)
                        .subtitle(format_date_str(a.date.as_deref()))
                        .line(a.content.clone());
                    if a.priority == "normal" {
                        card
                    } else {
                        card.badge(title_case(&a.priority))
                    }
                })
                .collect(),
        )
    }

    async fn load_fees(&self) -> Result<Content, AppError> {
        let fees = self.client.parent().fees().await?;
        if fees.is_empty() {
            return Ok(Content::Table(Table::default()));
        }
        let outstanding = outstanding_total(&fees);
        let table = Table::new(&["Description", "Amount", "Due", "Status"])
            .rows(fees.iter().map(|f| {
                vec![
                    f.description.clone(),
                    format_money(f.amount),
                    format_date_str(f.due_date.as_deref()),
                    title_case(&f.status),
                ]
            }))
            .row(vec![
                "Outstanding".into(),
                format_money(outstanding),
                String::new(),
                String::new(),
            ]);
        Ok(Content::Table(table))
    }

    async fn load_messages(&self) -> Content {
        let messages = self.client.parent().messages().await;
        Content::Cards(
            messages
                .iter()
                .map(|m| {
                    let card = Card::new(&m.subject)
                        .subtitle(format!("From {}", m.sender))
                        .line(m.content.clone())
                        .line(format_date_str(m.date.as_deref()));
                    if m.read {
                        card
                    } else {
                        card.badge("Unread")
                    }
                })
                .collect(),
        )
    }
}

impl Page for ParentPage {
    type Tab = ParentTab;

    fn name(&self) -> &'static str {
        "parent"
    }

    async fn load(&self, tab: ParentTab) -> Result<Content, AppError> {
        match tab {
            ParentTab::Dashboard => Ok(self.load_children().await),
            ParentTab::Grades => self.load_grades().await,
            ParentTab::Announcements => Ok(self.load_announcements().await),
            ParentTab::Fees => self.load_fees().await,
            ParentTab::Messages => Ok(self.load_messages().await),
        }
    }

    fn empty_message(&self, tab: ParentTab) -> &'static str {
        match tab {
            ParentTab::Dashboard => "No children linked to this account",
            ParentTab::Grades => "No grades recorded",
            ParentTab::Announcements => "No announcements",
            ParentTab::Fees => "No fees on record",
            ParentTab::Messages => "No messages",
        }
    }

    fn is_related(&self, tab: ParentTab, event: &RealtimeEvent) -> bool {
        match event {
            RealtimeEvent::GradeUpdate(_) => {
                matches!(tab, ParentTab::Grades | ParentTab::Dashboard)
            }
            RealtimeEvent::AttendanceUpdate(_) => tab == ParentTab::Dashboard,
            RealtimeEvent::AssignmentSubmission(_) => false,
            RealtimeEvent::MessageReceived(_) => tab == ParentTab::Messages,
        }
    }
}

/// Parent dashboard: tabs plus messaging the school.
pub struct ParentDashboard {
    client: SchoolClient,
    controller: Controller<ParentPage>,
    message_modal: Modal,
}

impl ParentDashboard {
    pub fn new(client: SchoolClient, view: Arc<dyn View>, query: Option<&str>) -> Self {
        let page = ParentPage::new(client.clone());
        let controller = Controller::new(page, view, Arc::clone(client.notifier()), query);
        Self {
            client,
            controller,
            message_modal: Modal::new(MESSAGE_MODAL, ModalKind::Add),
        }
    }

    pub fn controller(&self) -> &Controller<ParentPage> {
        &self.controller
    }

    pub fn message_modal(&self) -> &Modal {
        &self.message_modal
    }

    fn view(&self) -> &dyn View {
        self.controller.view().as_ref()
    }

    /// Switch the grades tab to another child.
    pub async fn select_child(&self, child_id: i64) {
        self.controller.page().select_child(child_id);
        if self.controller.current_tab() == ParentTab::Grades {
            self.controller.refresh().await;
        }
    }

    pub async fn send_message(&self) -> Result<(), AppError> {
        let result = match message_from_form(&self.message_modal.form()) {
            Ok(message) => self.client.parent().send_message(&message).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(_) => {
                self.client.notifier().success("Message sent successfully");
                self.message_modal.close(self.view());
                if self.controller.current_tab() == ParentTab::Messages {
                    self.controller.refresh().await;
                }
                Ok(())
            }
            Err(err) => {
                self.message_modal.show_errors(self.view(), &err);
                present_error(self.client.notifier().as_ref(), &err);
                Err(err)
            }
        }
    }
}

fn message_from_form(form: &FormState) -> Result<NewMessage, AppError> {
    Ok(NewMessage {
        recipient_id: form.number("recipient_id", "Please select a recipient")?,
        subject: form.text("subject"),
        content: form.text("content"),
    })
}
