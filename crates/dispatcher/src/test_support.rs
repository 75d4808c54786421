// SPDX-License-Identifier: MIT

//! Fakes shared by this crate's own tests and by `cronmesh-workflow`'s
//! tests (gated behind the `test-support` feature, mirroring
//! `cronmesh-core`'s convention).

use crate::error::TransportError;
use crate::transport::AgentTransport;
use async_trait::async_trait;
use cronmesh_core::Event;
use cronmesh_wire::ScheduleStatus;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// A scripted [`AgentTransport`]: each call to `schedule` pops the next
/// queued response, defaulting to `Ok(ScheduleStatus::Ok)` once the queue
/// is drained. Records every event it was asked to schedule.
pub struct FakeTransport {
    endpoint: String,
    schedule_responses: Mutex<VecDeque<Result<ScheduleStatus, TransportError>>>,
    pub scheduled: Mutex<Vec<Event>>,
}

impl FakeTransport {
    pub fn new(endpoint: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            endpoint: endpoint.into(),
            schedule_responses: Mutex::new(VecDeque::new()),
            scheduled: Mutex::new(Vec::new()),
        })
    }

    pub fn with_responses(
        endpoint: impl Into<String>,
        responses: Vec<Result<ScheduleStatus, TransportError>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            endpoint: endpoint.into(),
            schedule_responses: Mutex::new(responses.into()),
            scheduled: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl AgentTransport for FakeTransport {
    async fn check_running(
        &self,
        _project_id: i64,
        _task_id: &str,
    ) -> Result<(bool, String), TransportError> {
        Ok((false, String::new()))
    }

    async fn schedule(&self, event: Event) -> Result<ScheduleStatus, TransportError> {
        self.scheduled.lock().push(event);
        self.schedule_responses.lock().pop_front().unwrap_or(Ok(ScheduleStatus::Ok))
    }

    async fn kill_task(
        &self,
        _project_id: i64,
        _task_id: &str,
    ) -> Result<ScheduleStatus, TransportError> {
        Ok(ScheduleStatus::Ok)
    }

    async fn project_task_hash(&self, _project_id: i64) -> Result<(String, u64), TransportError> {
        Ok((String::new(), 0))
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
