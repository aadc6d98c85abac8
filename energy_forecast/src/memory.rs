//! In-process gateway backed by vectors
//!
//! Used by the CLI (loaded from files) and by tests. Bulk forecast appends
//! are atomic: either the whole batch lands or nothing does.

use crate::forecaster::ForecastPoint;
use crate::gateway::{
    apply_limit, order_forecasts, order_observations, ForecastFilter, GatewayError, GatewayResult,
    HistoricalDataGateway, ObservationFilter, ObservationRow, Query,
};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

#[derive(Debug, Default, Clone)]
struct Faults {
    query: Option<String>,
    write: Option<String>,
    forecast_capacity: Option<usize>,
}

#[derive(Debug, Default)]
pub struct InMemoryGateway {
    observations: RwLock<Vec<ObservationRow>>,
    forecasts: RwLock<Vec<ForecastPoint>>,
    faults: RwLock<Faults>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_observations(rows: Vec<ObservationRow>) -> Self {
        Self {
            observations: RwLock::new(rows),
            ..Self::default()
        }
    }

    pub fn with_forecasts(mut self, forecasts: Vec<ForecastPoint>) -> Self {
        self.forecasts = RwLock::new(forecasts);
        self
    }

    /// Make every query fail with `message`
    pub fn fail_queries(&self, message: impl Into<String>) -> GatewayResult<()> {
        write(&self.faults)?.query = Some(message.into());
        Ok(())
    }

    /// Make every write fail with `message`
    pub fn fail_writes(&self, message: impl Into<String>) -> GatewayResult<()> {
        write(&self.faults)?.write = Some(message.into());
        Ok(())
    }

    /// Cap the forecast log at `rows`; appends past the cap fail
    pub fn limit_forecast_log(&self, rows: usize) -> GatewayResult<()> {
        write(&self.faults)?.forecast_capacity = Some(rows);
        Ok(())
    }

    pub fn clear_faults(&self) -> GatewayResult<()> {
        *write(&self.faults)? = Faults::default();
        Ok(())
    }

    /// Snapshot of the forecast log in insertion order
    pub fn forecasts(&self) -> GatewayResult<Vec<ForecastPoint>> {
        Ok(read(&self.forecasts)?.clone())
    }

    /// Snapshot of the observations in insertion order
    pub fn observations(&self) -> GatewayResult<Vec<ObservationRow>> {
        Ok(read(&self.observations)?.clone())
    }

    fn check_query(&self) -> GatewayResult<()> {
        match &read(&self.faults)?.query {
            Some(message) => Err(GatewayError::Query(message.clone())),
            None => Ok(()),
        }
    }

    fn check_write(&self, stored: usize, incoming: usize) -> GatewayResult<()> {
        let faults = read(&self.faults)?;
        if let Some(message) = &faults.write {
            return Err(GatewayError::Write(message.clone()));
        }
        if let Some(capacity) = faults.forecast_capacity {
            if stored + incoming > capacity {
                return Err(GatewayError::Write(format!(
                    "forecast log holds at most {} rows, {} stored, {} incoming",
                    capacity, stored, incoming
                )));
            }
        }
        Ok(())
    }
}

impl HistoricalDataGateway for InMemoryGateway {
    fn query_observations(
        &self,
        query: &Query<ObservationFilter>,
    ) -> GatewayResult<Vec<ObservationRow>> {
        self.check_query()?;
        let mut rows: Vec<ObservationRow> = read(&self.observations)?
            .iter()
            .filter(|row| query.filter.matches(row))
            .cloned()
            .collect();
        order_observations(&mut rows, query.order);
        apply_limit(&mut rows, query.limit);
        Ok(rows)
    }

    fn query_forecasts(&self, query: &Query<ForecastFilter>) -> GatewayResult<Vec<ForecastPoint>> {
        self.check_query()?;
        let mut rows: Vec<ForecastPoint> = read(&self.forecasts)?
            .iter()
            .filter(|forecast| query.filter.matches(forecast))
            .cloned()
            .collect();
        order_forecasts(&mut rows, query.sort_key, query.order);
        apply_limit(&mut rows, query.limit);
        Ok(rows)
    }

    fn append_forecast(&self, forecast: &ForecastPoint) -> GatewayResult<()> {
        self.append_forecasts(std::slice::from_ref(forecast))
    }

    fn append_forecasts(&self, forecasts: &[ForecastPoint]) -> GatewayResult<()> {
        let mut log = write(&self.forecasts)?;
        self.check_write(log.len(), forecasts.len())?;
        log.extend_from_slice(forecasts);
        debug!(rows = forecasts.len(), total = log.len(), "appended forecasts");
        Ok(())
    }

    fn append_observations(&self, rows: &[ObservationRow]) -> GatewayResult<()> {
        let mut stored = write(&self.observations)?;
        if let Some(message) = &read(&self.faults)?.write {
            return Err(GatewayError::Write(message.clone()));
        }
        stored.extend_from_slice(rows);
        Ok(())
    }
}

fn read<T>(lock: &RwLock<T>) -> GatewayResult<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| GatewayError::Unavailable("lock poisoned".to_string()))
}

fn write<T>(lock: &RwLock<T>) -> GatewayResult<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| GatewayError::Unavailable("lock poisoned".to_string()))
}
