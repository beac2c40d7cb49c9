//! Popup content for a selected marker
//!
//! [`resolve_popup`] is an exhaustive match over [`EntityDetails`]: every
//! documented kind gets its own template, anything else lands in the generic
//! one. Missing optional fields resolve to placeholder text.

use crate::{
    core::constants::{NOT_AVAILABLE, NO_ADDRESS, UNKNOWN_STATUS},
    data::entity::{
        Address, Client, Competitor, Contact, EntityDetails, GenericEvent, MarkerEntity,
        Quotation, WorkerKind, WorkerStatus,
    },
    ui::style::{status_color, HexColor},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupTemplate {
    WorkerStatus,
    Client,
    Competitor,
    Quotation,
    Generic,
}

/// Colored status chip shown under the title
#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub label: String,
    pub color: HexColor,
}

impl Badge {
    pub fn status(label: impl Into<String>) -> Self {
        let label = label.into();
        let color = status_color(&label);
        Self { label, color }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PopupSection {
    pub heading: &'static str,
    pub rows: Vec<PopupRow>,
}

impl PopupSection {
    fn new(heading: &'static str) -> Self {
        Self {
            heading,
            rows: Vec::new(),
        }
    }

    fn row(mut self, label: &'static str, value: impl Into<String>) -> Self {
        self.rows.push(PopupRow {
            label,
            value: value.into(),
        });
        self
    }

    /// Row with a placeholder when the value is missing
    fn row_or(self, label: &'static str, value: Option<&str>, placeholder: &str) -> Self {
        self.row(label, value.unwrap_or(placeholder))
    }

    /// Row that is only added when the value is present
    fn row_if(self, label: &'static str, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.row(label, value),
            None => self,
        }
    }

    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }
}

/// Everything a surface needs to draw the detail popup
#[derive(Debug, Clone, PartialEq)]
pub struct PopupContent {
    pub template: PopupTemplate,
    pub title: String,
    pub subtitle: Option<String>,
    pub badges: Vec<Badge>,
    pub sections: Vec<PopupSection>,
}

impl PopupContent {
    pub fn section(&self, heading: &str) -> Option<&PopupSection> {
        self.sections.iter().find(|s| s.heading == heading)
    }

    pub fn has_section(&self, heading: &str) -> bool {
        self.section(heading).is_some()
    }
}

pub fn resolve_popup(entity: &MarkerEntity) -> PopupContent {
    match &entity.details {
        EntityDetails::Worker(worker) => worker_popup(entity, worker),
        EntityDetails::Client(client) => client_popup(entity, client),
        EntityDetails::Competitor(competitor) => competitor_popup(entity, competitor),
        EntityDetails::Quotation(quotation) => quotation_popup(entity, quotation),
        EntityDetails::Event(event) => generic_popup(entity, event),
    }
}

fn worker_popup(entity: &MarkerEntity, worker: &WorkerStatus) -> PopupContent {
    let title = worker
        .name
        .clone()
        .or_else(|| worker.title.clone())
        .unwrap_or_else(|| format!("{} {}", worker.kind.label(), entity.id));

    let mut sections = vec![PopupSection::new("Status")
        .row_or("Job status", worker.job_status.as_deref(), UNKNOWN_STATUS)
        .row_or("Time", worker.timestamp.as_deref(), NOT_AVAILABLE)
        .row("Address", address_line(worker.address.as_ref()))
        .row_if("Details", worker.description.as_deref())
        .row_if("Notes", worker.notes.as_deref())];

    let is_break = matches!(worker.kind, WorkerKind::BreakStart | WorkerKind::BreakEnd);
    if is_break || worker.break_data.is_some() {
        let data = worker.break_data.clone().unwrap_or_default();
        let duration = data.duration_minutes.map(|m| format!("{m:.0} min"));
        sections.push(
            PopupSection::new("Break")
                .row_or("Started", data.start_time.as_deref(), NOT_AVAILABLE)
                .row_or("Ended", data.end_time.as_deref(), NOT_AVAILABLE)
                .row_or("Duration", duration.as_deref(), NOT_AVAILABLE)
                .row_if("Reason", data.reason.as_deref()),
        );
    }

    let is_shift = matches!(worker.kind, WorkerKind::ShiftStart | WorkerKind::ShiftEnd);
    if is_shift || worker.schedule.is_some() {
        let schedule = worker.schedule.clone().unwrap_or_default();
        sections.push(
            PopupSection::new("Schedule")
                .row_or("Shift", schedule.shift_name.as_deref(), NOT_AVAILABLE)
                .row_or("Starts", schedule.start_time.as_deref(), NOT_AVAILABLE)
                .row_or("Ends", schedule.end_time.as_deref(), NOT_AVAILABLE),
        );
    }

    if worker.kind == WorkerKind::Task || worker.task.is_some() {
        let task = worker.task.clone().unwrap_or_default();
        sections.push(
            PopupSection::new("Task")
                .row_or("Title", task.title.as_deref(), NOT_AVAILABLE)
                .row_or("Status", task.status.as_deref(), UNKNOWN_STATUS)
                .row_or("Priority", task.priority.as_deref(), NOT_AVAILABLE)
                .row_or("Due", task.due_date.as_deref(), NOT_AVAILABLE),
        );
    }

    PopupContent {
        template: PopupTemplate::WorkerStatus,
        title,
        subtitle: Some(worker.kind.label().to_string()),
        badges: vec![Badge::status(
            worker.job_status.as_deref().unwrap_or(UNKNOWN_STATUS),
        )],
        sections,
    }
}

fn client_popup(entity: &MarkerEntity, client: &Client) -> PopupContent {
    let mut badges = vec![Badge::status(
        client.status.as_deref().unwrap_or(UNKNOWN_STATUS),
    )];
    if let Some(tier) = &client.price_tier {
        badges.push(Badge::status(tier.clone()));
    }

    let mut sections = vec![PopupSection::new("Client Information")
        .row_or("Reference", client.reference.as_deref(), NOT_AVAILABLE)
        .row_or("Status", client.status.as_deref(), UNKNOWN_STATUS)
        .row_or("Category", client.category.as_deref(), NOT_AVAILABLE)
        .row_or("Price tier", client.price_tier.as_deref(), NOT_AVAILABLE)];
    sections.extend(address_block(client.address.as_ref()));
    sections.extend(contact_block(client.contact.as_ref()));

    PopupContent {
        template: PopupTemplate::Client,
        title: client
            .name
            .clone()
            .unwrap_or_else(|| format!("Client {}", entity.id)),
        subtitle: client.reference.clone(),
        badges,
        sections,
    }
}

fn competitor_popup(entity: &MarkerEntity, competitor: &Competitor) -> PopupContent {
    let mut badges = Vec::new();
    if let Some(level) = &competitor.threat_level {
        let mut badge = Badge::status(level.clone());
        badge.label = format!("{level} threat");
        badges.push(badge);
    }
    match competitor.is_direct {
        Some(true) => badges.push(Badge::status("Direct")),
        Some(false) => badges.push(Badge::status("Indirect")),
        None => {}
    }

    let geofence = competitor.geofencing.as_ref().map(|g| {
        match (g.enabled.unwrap_or(false), g.radius_meters) {
            (true, Some(radius)) => format!("Enabled ({radius:.0} m)"),
            (true, None) => "Enabled".to_string(),
            (false, _) => "Disabled".to_string(),
        }
    });

    let mut sections = vec![PopupSection::new("Competitor Information")
        .row_or("Threat level", competitor.threat_level.as_deref(), NOT_AVAILABLE)
        .row(
            "Type",
            match competitor.is_direct {
                Some(true) => "Direct",
                Some(false) => "Indirect",
                None => NOT_AVAILABLE,
            },
        )
        .row_or("Geofencing", geofence.as_deref(), NOT_AVAILABLE)
        .row_if("Notes", competitor.notes.as_deref())];
    sections.extend(address_block(competitor.address.as_ref()));
    sections.extend(contact_block(competitor.contact.as_ref()));

    PopupContent {
        template: PopupTemplate::Competitor,
        title: competitor
            .name
            .clone()
            .unwrap_or_else(|| format!("Competitor {}", entity.id)),
        subtitle: None,
        badges,
        sections,
    }
}

fn quotation_popup(entity: &MarkerEntity, quotation: &Quotation) -> PopupContent {
    let amount = quotation.total_amount.map(|amount| match &quotation.currency {
        Some(currency) => format!("{currency} {amount:.2}"),
        None => format!("{amount:.2}"),
    });
    let number = quotation
        .quotation_number
        .clone()
        .unwrap_or_else(|| entity.id.to_string());

    PopupContent {
        template: PopupTemplate::Quotation,
        title: format!("Quotation {number}"),
        subtitle: quotation.client_name.clone(),
        badges: vec![Badge::status(
            quotation.status.as_deref().unwrap_or(UNKNOWN_STATUS),
        )],
        sections: vec![PopupSection::new("Quotation Details")
            .row_or("Client", quotation.client_name.as_deref(), NOT_AVAILABLE)
            .row_or("Total", amount.as_deref(), NOT_AVAILABLE)
            .row_or("Status", quotation.status.as_deref(), UNKNOWN_STATUS)
            .row_or("Valid until", quotation.valid_until.as_deref(), NOT_AVAILABLE)
            .row_or("Created", quotation.created_at.as_deref(), NOT_AVAILABLE)],
    }
}

fn generic_popup(entity: &MarkerEntity, event: &GenericEvent) -> PopupContent {
    let position = entity.position;
    PopupContent {
        template: PopupTemplate::Generic,
        title: event
            .title
            .clone()
            .unwrap_or_else(|| format!("{} {}", event.marker_type, entity.id)),
        subtitle: Some(event.marker_type.clone()),
        badges: Vec::new(),
        sections: vec![PopupSection::new("Details")
            .row("Type", event.marker_type.clone())
            .row_if("Description", event.description.as_deref())
            .row_or("Time", event.timestamp.as_deref(), NOT_AVAILABLE)
            .row(
                "Coordinates",
                format!("{:.5}, {:.5}", position.lat, position.lng),
            )],
    }
}

fn address_line(address: Option<&Address>) -> String {
    address
        .and_then(Address::one_line)
        .unwrap_or_else(|| NO_ADDRESS.to_string())
}

fn address_block(address: Option<&Address>) -> Option<PopupSection> {
    let line = address.and_then(Address::one_line)?;
    Some(PopupSection::new("Address").row("Address", line))
}

fn contact_block(contact: Option<&Contact>) -> Option<PopupSection> {
    let contact = contact.filter(|c| !c.is_empty())?;
    Some(
        PopupSection::new("Contact")
            .row_if("Name", contact.name.as_deref())
            .row_if("Phone", contact.phone.as_deref())
            .row_if("Email", contact.email.as_deref()),
    )
}

#[cfg(feature = "egui")]
mod render {
    use super::PopupContent;
    use egui::{Color32, RichText, Ui};

    impl PopupContent {
        /// Draws the popup body into an existing container
        pub fn show(&self, ui: &mut Ui) {
            ui.set_max_width(280.0);
            ui.label(RichText::new(&self.title).strong().size(15.0));
            if let Some(subtitle) = &self.subtitle {
                ui.label(RichText::new(subtitle).weak());
            }

            if !self.badges.is_empty() {
                ui.horizontal_wrapped(|ui| {
                    for badge in &self.badges {
                        ui.label(
                            RichText::new(&badge.label)
                                .small()
                                .color(Color32::WHITE)
                                .background_color(Color32::from(badge.color)),
                        );
                    }
                });
            }

            for (index, section) in self.sections.iter().enumerate() {
                ui.separator();
                ui.label(RichText::new(section.heading).strong());
                egui::Grid::new(("popup-section", index))
                    .num_columns(2)
                    .spacing([8.0, 2.0])
                    .show(ui, |ui| {
                        for row in &section.rows {
                            ui.label(RichText::new(row.label).weak());
                            ui.label(&row.value);
                            ui.end_row();
                        }
                    });
            }
        }
    }
}
