use tracing::info;

use crate::error::AppError;
use crate::models::{Event, EventDetails, EventForm, EventType, EventTypeForm};
use crate::AppState;

use super::{now, rejected};

pub struct EventService<'a> {
    state: &'a AppState,
}

impl<'a> EventService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn list(&self) -> Result<Vec<EventDetails>, AppError> {
        Ok(self.state.store.list_events().await?)
    }

    pub async fn get(&self, id: i64) -> Result<EventDetails, AppError> {
        self.state
            .store
            .find_event(id)
            .await?
            .ok_or(AppError::NotFound("Event"))
    }

    pub async fn create(&self, form: EventForm) -> Result<Event, AppError> {
        let event = form.into_new_event()?;
        let created = self
            .state
            .store
            .insert_event(&event)
            .await
            .map_err(|e| rejected("create_event", e))?;

        info!("Event {} created: {}", created.event_id, created.event_name);
        Ok(created)
    }

    pub async fn update(&self, id: i64, form: EventForm) -> Result<Event, AppError> {
        let event = form.into_new_event()?;
        let updated = self
            .state
            .store
            .update_event(id, &event)
            .await
            .map_err(|e| rejected("update_event", e))?;

        info!("Event {} updated", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<Event, AppError> {
        let deleted = self
            .state
            .store
            .delete_event(id, now())
            .await
            .map_err(|e| rejected("delete_event", e))?;

        info!("Event {} deleted", id);
        Ok(deleted)
    }
}

pub struct EventTypeService<'a> {
    state: &'a AppState,
}

impl<'a> EventTypeService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    pub async fn list(&self) -> Result<Vec<EventType>, AppError> {
        Ok(self.state.store.list_event_types().await?)
    }

    pub async fn create(&self, form: EventTypeForm) -> Result<EventType, AppError> {
        let event_type = form.into_new_event_type()?;
        let created = self
            .state
            .store
            .insert_event_type(&event_type)
            .await
            .map_err(|e| rejected("create_event_type", e))?;

        info!(
            "Event type {} created: {}",
            created.event_type_id, created.event_type_name
        );
        Ok(created)
    }
}
