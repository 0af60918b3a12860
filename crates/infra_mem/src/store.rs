//! The in-memory store
//!
//! One `tokio::sync::RwLock` guards all tables, so every store method is
//! a transaction: multi-row operations (claiming appointments for a
//! request, persisting a report with its boletas) observe and mutate a
//! consistent snapshot, which is exactly the atomicity the domain ports
//! demand. Clones share the same underlying state.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use core_kernel::{
    AdapterHealth, AppointmentId, CoverageProfile, DomainPort, HealthCheckResult, HealthCheckable,
    HealthSystem, InvoiceId, MonthPeriod, PatientId, PortError, ProfessionalId,
    ReimbursementRequestId, Timezone,
};
use domain_billing::{BillingStore, Invoice, Payment};
use domain_reimbursement::{ReimbursementRequest, ReimbursementStore, SessionRecord};
use domain_reporting::{ActivityRecord, MonthlyReport, ReportingStore};
use domain_scheduling::{Appointment, AppointmentStatus};

#[derive(Default)]
struct StoreState {
    appointments: HashMap<AppointmentId, Appointment>,
    professional_names: HashMap<ProfessionalId, String>,
    coverage: HashMap<PatientId, CoverageProfile>,
    /// One payment per appointment
    payments: HashMap<AppointmentId, Payment>,
    /// One boleta per appointment
    invoices: HashMap<AppointmentId, Invoice>,
    requests: HashMap<ReimbursementRequestId, ReimbursementRequest>,
    reports: HashMap<(ProfessionalId, MonthPeriod), MonthlyReport>,
}

impl StoreState {
    fn session_record(&self, appointment: &Appointment) -> SessionRecord {
        SessionRecord {
            appointment: appointment.clone(),
            professional_name: self
                .professional_names
                .get(&appointment.professional_id)
                .cloned()
                .unwrap_or_else(|| appointment.professional_id.to_string()),
            payment: self.payments.get(&appointment.id).cloned(),
            invoice: self.invoices.get(&appointment.id).cloned(),
        }
    }

    /// Health system of record for an appointment: the boleta snapshot
    /// when one exists, otherwise the patient's current coverage
    fn health_system_for(&self, appointment: &Appointment) -> HealthSystem {
        self.invoices
            .get(&appointment.id)
            .map(|i| i.health_system)
            .or_else(|| {
                self.coverage
                    .get(&appointment.patient_id)
                    .map(|c| c.health_system)
            })
            .unwrap_or(HealthSystem::Private)
    }
}

/// In-memory implementation of the domain store ports
///
/// A cheap-to-clone handle; all clones operate on the same state.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
    tz: Timezone,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // --- seeding and test/demo support -----------------------------------

    pub async fn seed_professional(&self, id: ProfessionalId, name: impl Into<String>) {
        self.state
            .write()
            .await
            .professional_names
            .insert(id, name.into());
    }

    pub async fn seed_coverage(&self, patient_id: PatientId, profile: CoverageProfile) {
        self.state.write().await.coverage.insert(patient_id, profile);
    }

    pub async fn seed_appointment(&self, appointment: Appointment) {
        self.state
            .write()
            .await
            .appointments
            .insert(appointment.id, appointment);
    }

    pub async fn seed_invoice(&self, invoice: Invoice) {
        self.state
            .write()
            .await
            .invoices
            .insert(invoice.appointment_id, invoice);
    }

    /// Seeds a full session in one call
    pub async fn seed_session(
        &self,
        appointment: Appointment,
        payment: Option<Payment>,
        invoice: Option<Invoice>,
    ) {
        let mut state = self.state.write().await;
        if let Some(payment) = payment {
            state.payments.insert(appointment.id, payment);
        }
        if let Some(invoice) = invoice {
            state.invoices.insert(appointment.id, invoice);
        }
        state.appointments.insert(appointment.id, appointment);
    }

    pub async fn get_appointment(&self, id: AppointmentId) -> Option<Appointment> {
        self.state.read().await.appointments.get(&id).cloned()
    }

    pub async fn get_invoice(&self, id: InvoiceId) -> Option<Invoice> {
        let state = self.state.read().await;
        state.invoices.values().find(|i| i.id == id).cloned()
    }

    /// Records that a session took place
    pub async fn complete_appointment(&self, id: AppointmentId) -> Result<(), PortError> {
        let mut state = self.state.write().await;
        let appointment = state
            .appointments
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("Appointment", id))?;
        appointment
            .complete()
            .map_err(|e| PortError::validation(e.to_string()))
    }
}

impl DomainPort for InMemoryStore {}

#[async_trait]
impl ReimbursementStore for InMemoryStore {
    async fn load_sessions(&self, patient_id: PatientId) -> Result<Vec<SessionRecord>, PortError> {
        let state = self.state.read().await;
        let mut records: Vec<SessionRecord> = state
            .appointments
            .values()
            .filter(|a| a.patient_id == patient_id)
            .map(|a| state.session_record(a))
            .collect();
        records.sort_by_key(|r| r.appointment.scheduled_at);
        Ok(records)
    }

    async fn patient_coverage(&self, patient_id: PatientId) -> Result<CoverageProfile, PortError> {
        let state = self.state.read().await;
        // Unknown coverage is treated as no insurer relationship
        Ok(state
            .coverage
            .get(&patient_id)
            .cloned()
            .unwrap_or_else(CoverageProfile::private))
    }

    async fn create_request(&self, request: &ReimbursementRequest) -> Result<(), PortError> {
        let mut state = self.state.write().await;

        // Validate every appointment before touching any of them
        for id in &request.appointment_ids {
            let appointment = state
                .appointments
                .get(id)
                .ok_or_else(|| PortError::not_found("Appointment", id))?;
            if appointment.patient_id != request.patient_id {
                return Err(PortError::unauthorized(format!(
                    "appointment {id} does not belong to patient"
                )));
            }
            if appointment.status != AppointmentStatus::Completed {
                return Err(PortError::conflict(format!(
                    "appointment {id} is no longer claimable"
                )));
            }
            if appointment.reimbursement_request_id.is_some() {
                return Err(PortError::conflict(format!(
                    "appointment {id} already claimed"
                )));
            }
        }

        for id in &request.appointment_ids {
            let appointment = state.appointments.get_mut(id).expect("validated above");
            appointment
                .link_reimbursement(request.id)
                .map_err(|e| PortError::conflict(e.to_string()))?;
        }
        state.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn get_request(
        &self,
        id: ReimbursementRequestId,
    ) -> Result<Option<ReimbursementRequest>, PortError> {
        Ok(self.state.read().await.requests.get(&id).cloned())
    }

    async fn list_requests(
        &self,
        patient_id: PatientId,
    ) -> Result<Vec<ReimbursementRequest>, PortError> {
        let state = self.state.read().await;
        let mut requests: Vec<ReimbursementRequest> = state
            .requests
            .values()
            .filter(|r| r.patient_id == patient_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(requests)
    }

    async fn update_request(&self, request: &ReimbursementRequest) -> Result<(), PortError> {
        let mut state = self.state.write().await;
        if !state.requests.contains_key(&request.id) {
            return Err(PortError::not_found("ReimbursementRequest", request.id));
        }
        state.requests.insert(request.id, request.clone());
        Ok(())
    }

    async fn release_appointments(
        &self,
        request_id: ReimbursementRequestId,
    ) -> Result<(), PortError> {
        let mut state = self.state.write().await;
        for appointment in state.appointments.values_mut() {
            if appointment.reimbursement_request_id == Some(request_id) {
                appointment
                    .unlink_reimbursement(request_id)
                    .map_err(|e| PortError::internal(e.to_string()))?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ReportingStore for InMemoryStore {
    async fn find_report(
        &self,
        professional_id: ProfessionalId,
        period: MonthPeriod,
    ) -> Result<Option<MonthlyReport>, PortError> {
        let state = self.state.read().await;
        Ok(state.reports.get(&(professional_id, period)).cloned())
    }

    async fn load_activity(
        &self,
        professional_id: ProfessionalId,
        period: MonthPeriod,
    ) -> Result<Vec<ActivityRecord>, PortError> {
        let state = self.state.read().await;
        let mut records: Vec<ActivityRecord> = state
            .appointments
            .values()
            .filter(|a| {
                a.professional_id == professional_id
                    && matches!(
                        a.status,
                        AppointmentStatus::Completed | AppointmentStatus::Cancelled
                    )
                    && period.contains(a.scheduled_at, self.tz)
            })
            .map(|a| ActivityRecord {
                health_system: state.health_system_for(a),
                payment: state.payments.get(&a.id).cloned(),
                invoice: state.invoices.get(&a.id).cloned(),
                appointment: a.clone(),
            })
            .collect();
        records.sort_by_key(|r| r.appointment.scheduled_at);
        Ok(records)
    }

    async fn next_invoice_suffix(&self, period: MonthPeriod) -> Result<u32, PortError> {
        let state = self.state.read().await;
        let prefix = format!("BH-{}-", period.label());
        let max = state
            .invoices
            .values()
            .filter_map(|i| i.invoice_number.strip_prefix(&prefix))
            .filter_map(|suffix| suffix.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        Ok(max + 1)
    }

    async fn persist_report(
        &self,
        report: &MonthlyReport,
        new_invoices: &[Invoice],
    ) -> Result<(), PortError> {
        let mut state = self.state.write().await;
        let key = (report.professional_id, report.period);
        if state.reports.contains_key(&key) {
            return Err(PortError::conflict(format!(
                "report for {} {} already exists",
                report.professional_id, report.period
            )));
        }
        // Boleta numbers are unique platform-wide; a collision means a
        // concurrent generation won the suffix race
        for invoice in new_invoices {
            if state
                .invoices
                .values()
                .any(|existing| existing.invoice_number == invoice.invoice_number)
            {
                return Err(PortError::conflict(format!(
                    "invoice number {} already issued",
                    invoice.invoice_number
                )));
            }
        }
        for invoice in new_invoices {
            state.invoices.insert(invoice.appointment_id, invoice.clone());
        }
        state.reports.insert(key, report.clone());
        Ok(())
    }
}

#[async_trait]
impl BillingStore for InMemoryStore {
    async fn find_payment_by_token(&self, token: &str) -> Result<Option<Payment>, PortError> {
        let state = self.state.read().await;
        Ok(state
            .payments
            .values()
            .find(|p| p.gateway_token.as_deref() == Some(token))
            .cloned())
    }

    async fn save_payment(&self, payment: &Payment) -> Result<(), PortError> {
        let mut state = self.state.write().await;
        state.payments.insert(payment.appointment_id, payment.clone());
        Ok(())
    }

    async fn mark_appointment_confirmed(
        &self,
        appointment_id: AppointmentId,
    ) -> Result<(), PortError> {
        let mut state = self.state.write().await;
        let appointment = state
            .appointments
            .get_mut(&appointment_id)
            .ok_or_else(|| PortError::not_found("Appointment", appointment_id))?;
        appointment
            .confirm()
            .map_err(|e| PortError::validation(e.to_string()))
    }
}

#[async_trait]
impl HealthCheckable for InMemoryStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let state = self.state.read().await;
        let appointments = state.appointments.len();
        drop(state);

        HealthCheckResult {
            adapter_id: "in-memory-store".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: start.elapsed().as_millis() as u64,
            message: Some(format!("{appointments} appointments held")),
            checked_at: Utc::now(),
        }
    }
}
