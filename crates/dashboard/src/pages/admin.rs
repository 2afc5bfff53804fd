use std::sync::Arc;

use client::api::admin::CLASS_HAS_STUDENTS;
use client::SchoolClient;
use parking_lot::Mutex;
use shared_types::{
    AppError, EnrollStudentsRequest, NewClass, NewPerson, PeopleQuery, PersonKind, RealtimeEvent,
};

use super::present_error;
use crate::controller::{Controller, Page};
use crate::modal::{FormState, Modal, ModalKind};
use crate::render::{title_case, Card, Content, Stat, Table};
use crate::tabs::TabKind;
use crate::view::View;

pub const PERSON_MODAL: &str = "add-person";
pub const CLASS_MODAL: &str = "add-class";

/// Shown instead of the server's wording when a class cannot be deleted
/// because students are still enrolled.
pub const CLASS_HAS_STUDENTS_MESSAGE: &str =
    "This class still has enrolled students. Remove them before deleting the class.";

const DEFAULT_CLASS_CAPACITY: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminTab {
    Dashboard,
    Students,
    Teachers,
    Parents,
    Classes,
}

impl AdminTab {
    fn person_kind(&self) -> Option<PersonKind> {
        match self {
            AdminTab::Students => Some(PersonKind::Student),
            AdminTab::Teachers => Some(PersonKind::Teacher),
            AdminTab::Parents => Some(PersonKind::Parent),
            AdminTab::Dashboard | AdminTab::Classes => None,
        }
    }

    fn for_kind(kind: PersonKind) -> Self {
        match kind {
            PersonKind::Student => AdminTab::Students,
            PersonKind::Teacher => AdminTab::Teachers,
            PersonKind::Parent => AdminTab::Parents,
        }
    }
}

impl TabKind for AdminTab {
    const ALL: &'static [Self] = &[
        AdminTab::Dashboard,
        AdminTab::Students,
        AdminTab::Teachers,
        AdminTab::Parents,
        AdminTab::Classes,
    ];

    fn id(&self) -> &'static str {
        match self {
            AdminTab::Dashboard => "dashboard",
            AdminTab::Students => "students",
            AdminTab::Teachers => "teachers",
            AdminTab::Parents => "parents",
            AdminTab::Classes => "classes",
        }
    }

    fn default_tab() -> Self {
        AdminTab::Dashboard
    }
}

pub struct AdminPage {
    client: SchoolClient,
    search: Mutex<PeopleQuery>,
}

impl AdminPage {
    pub fn new(client: SchoolClient) -> Self {
        Self {
            client,
            search: Mutex::new(PeopleQuery::default()),
        }
    }

    pub fn set_search(&self, query: PeopleQuery) {
        *self.search.lock() = query;
    }

    async fn load_stats(&self) -> Result<Content, AppError> {
        let stats = self.client.admin().stats().await?;
        Ok(Content::Stats(vec![
            Stat::new("Students", stats.students),
            Stat::new("Teachers", stats.teachers),
            Stat::new("Parents", stats.parents),
            Stat::new("Classes", stats.classes),
        ]))
    }

    async fn load_people(&self, kind: PersonKind) -> Content {
        let query = self.search.lock().clone();
        let people = self.client.admin().people(kind, &query).await;
        let rows = people.iter().map(|p| {
            let detail = match kind {
                PersonKind::Student => match (&p.grade, &p.section) {
                    (Some(g), Some(s)) => format!("{g}-{s}"),
                    _ => "-".into(),
                },
                PersonKind::Teacher => p.subject.clone().unwrap_or_else(|| "-".into()),
                PersonKind::Parent => p.contact.clone().unwrap_or_else(|| "-".into()),
            };
            let status = if p.is_active { "Active" } else { "Inactive" };
            vec![p.full_name.clone(), p.email.clone(), detail, status.to_string()]
        });
        let detail_header = match kind {
            PersonKind::Student => "Class",
            PersonKind::Teacher => "Subject",
            PersonKind::Parent => "Contact",
        };
        Content::Table(Table::new(&["Name", "Email", detail_header, "Status"]).rows(rows))
    }

    async fn load_classes(&self) -> Content {
        let classes = self.client.admin().classes().await;
        Content::Cards(
            classes
                .iter()
                .map(|class| {
                    let teacher = class
                        .teacher
                        .as_ref()
                        .map(|t| t.full_name.clone())
                        .unwrap_or_else(|| "Unassigned".into());
                    let capacity = class
                        .capacity
                        .map(|c| format!("{}/{c} students", class.current_students))
                        .unwrap_or_else(|| format!("{} students", class.current_students));
                    Card::new(&class.name)
                        .subtitle(class.grade_section())
                        .line(format!("Teacher: {teacher}"))
                        .line(capacity)
                        .badge(title_case(&class.status))
                })
                .collect(),
        )
    }
}

impl Page for AdminPage {
    type Tab = AdminTab;

    fn name(&self) -> &'static str {
        "admin"
    }

    async fn load(&self, tab: AdminTab) -> Result<Content, AppError> {
        match (tab, tab.person_kind()) {
            (AdminTab::Dashboard, _) => self.load_stats().await,
            (AdminTab::Classes, _) => Ok(self.load_classes().await),
            (_, Some(kind)) => Ok(self.load_people(kind).await),
            (_, None) => Ok(Content::Table(Table::default())),
        }
    }

    fn empty_message(&self, tab: AdminTab) -> &'static str {
        match tab {
            AdminTab::Dashboard => "No statistics available",
            AdminTab::Students => "No students found",
            AdminTab::Teachers => "No teachers found",
            AdminTab::Parents => "No parents found",
            AdminTab::Classes => "No classes yet",
        }
    }

    /// Pushed updates concern gradebooks and attendance sheets, which no
    /// admin tab shows.
    fn is_related(&self, _tab: AdminTab, _event: &RealtimeEvent) -> bool {
        false
    }
}

/// Admin dashboard: people and class management.
pub struct AdminDashboard {
    client: SchoolClient,
    controller: Controller<AdminPage>,
    person_modal: Modal,
    class_modal: Modal,
}

impl AdminDashboard {
    pub fn new(client: SchoolClient, view: Arc<dyn View>, query: Option<&str>) -> Self {
        let page = AdminPage::new(client.clone());
        let controller = Controller::new(page, view, Arc::clone(client.notifier()), query);
        Self {
            client,
            controller,
            person_modal: Modal::new(PERSON_MODAL, ModalKind::Add),
            class_modal: Modal::new(CLASS_MODAL, ModalKind::Add),
        }
    }

    pub fn controller(&self) -> &Controller<AdminPage> {
        &self.controller
    }

    pub fn person_modal(&self) -> &Modal {
        &self.person_modal
    }

    pub fn class_modal(&self) -> &Modal {
        &self.class_modal
    }

    fn view(&self) -> &dyn View {
        self.controller.view().as_ref()
    }

    /// Filter the people tabs and reload the one showing.
    pub async fn search(&self, query: PeopleQuery) {
        self.controller.page().set_search(query);
        if self.controller.current_tab().person_kind().is_some() {
            self.controller.refresh().await;
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn submit_person(&self, kind: PersonKind) -> Result<(), AppError> {
        let person = person_from_form(&self.person_modal.form());
        match self.client.admin().create_person(kind, person).await {
            Ok(created) => {
                tracing::info!(person_id = created.id, kind = kind.label(), "person created");
                self.client
                    .notifier()
                    .success(&format!("{} added successfully", kind.label()));
                self.person_modal.close(self.view());
                self.controller.activate(AdminTab::for_kind(kind)).await;
                Ok(())
            }
            Err(err) => {
                self.person_modal.show_errors(self.view(), &err);
                present_error(self.client.notifier().as_ref(), &err);
                Err(err)
            }
        }
    }

    pub async fn delete_person(&self, kind: PersonKind, id: i64) -> Result<(), AppError> {
        self.client.admin().delete_person(kind, id).await.inspect_err(|err| {
            present_error(self.client.notifier().as_ref(), err);
        })?;
        self.client
            .notifier()
            .success(&format!("{} deleted successfully", kind.label()));
        if self.controller.current_tab() == AdminTab::for_kind(kind) {
            self.controller.refresh().await;
        }
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub async fn submit_class(&self) -> Result<(), AppError> {
        let result = match class_from_form(&self.class_modal.form()) {
            Ok(class) => self.client.admin().create_class(&class).await,
            Err(err) => Err(err),
        };
        match result {
            Ok(created) => {
                tracing::info!(class_id = created.id, "class created");
                self.client.notifier().success("Class created successfully");
                self.class_modal.close(self.view());
                self.controller.activate(AdminTab::Classes).await;
                Ok(())
            }
            Err(err) => {
                self.class_modal.show_errors(self.view(), &err);
                present_error(self.client.notifier().as_ref(), &err);
                Err(err)
            }
        }
    }

    /// Delete a class. A class with enrolled students gets a tailored
    /// explanation rather than the raw server message.
    pub async fn delete_class(&self, class_id: i64) -> Result<(), AppError> {
        match self.client.admin().delete_class(class_id).await {
            Ok(()) => {
                self.client.notifier().success("Class deleted successfully");
                if self.controller.current_tab() == AdminTab::Classes {
                    self.controller.refresh().await;
                }
                Ok(())
            }
            Err(err) if err.code.as_deref() == Some(CLASS_HAS_STUDENTS) => {
                tracing::info!(class_id, "class still has students");
                self.client.notifier().error(CLASS_HAS_STUDENTS_MESSAGE);
                Err(err)
            }
            Err(err) => {
                present_error(self.client.notifier().as_ref(), &err);
                Err(err)
            }
        }
    }

    pub async fn enroll_students(
        &self,
        class_id: i64,
        student_ids: Vec<i64>,
    ) -> Result<usize, AppError> {
        let request = EnrollStudentsRequest { student_ids };
        match self.client.admin().enroll_students(class_id, &request).await {
            Ok(enrolled) => {
                self.client
                    .notifier()
                    .success(&format!("{} student(s) enrolled", enrolled.len()));
                if self.controller.current_tab() == AdminTab::Classes {
                    self.controller.refresh().await;
                }
                Ok(enrolled.len())
            }
            Err(err) => {
                present_error(self.client.notifier().as_ref(), &err);
                Err(err)
            }
        }
    }
}

fn person_from_form(form: &FormState) -> NewPerson {
    NewPerson {
        full_name: form.text("full_name"),
        email: form.text("email"),
        password: form.optional("password"),
        role: None,
        contact: form.optional("contact"),
        grade: form.optional("grade"),
        section: form.optional("section"),
        subject: form.optional("subject"),
        qualification: form.optional("qualification"),
    }
}

fn class_from_form(form: &FormState) -> Result<NewClass, AppError> {
    let capacity = match form.optional("capacity") {
        Some(_) => form.number("capacity", "Capacity is required")?,
        None => DEFAULT_CLASS_CAPACITY,
    };
    let teacher_id = match form.optional("teacher_id") {
        Some(_) => Some(form.number("teacher_id", "Please select a teacher")?),
        None => None,
    };
    Ok(NewClass {
        name: form.text("name"),
        grade: form.text("grade"),
        section: form.text("section"),
        subject: form.text("subject"),
        teacher_id,
        capacity,
        schedule: form.text("schedule"),
        room: form.text("room"),
    })
}
