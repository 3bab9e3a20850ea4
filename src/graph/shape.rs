use std::fmt;

use super::{Inlet, Outlet};
use crate::AppData;

pub trait Shape: fmt::Debug {}

pub trait SourceShape: Shape {
    type Out: AppData;
    fn outlet(&self) -> Outlet<Self::Out>;
}

pub trait SinkShape: Shape {
    type In: AppData;
    fn inlet(&self) -> Inlet<Self::In>;
}

pub trait ThroughShape: SourceShape + SinkShape {}
