//! Dashboard descriptors: widgets, their grid placement and the active tab.
//!
//! These are plain serializable values handed to the persistence and export
//! collaborators. Nothing here renders anything.

use crate::charts::registry::{is_config_complete, ChartCandidate, ChartType};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default widget footprint in grid cells
const DEFAULT_WIDGET_W: u32 = 6;
const DEFAULT_WIDGET_H: u32 = 4;

/// Grid placement of a widget
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WidgetLayout {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Default for WidgetLayout {
    fn default() -> Self {
        Self {
            x: 0,
            y: 0,
            w: DEFAULT_WIDGET_W,
            h: DEFAULT_WIDGET_H,
        }
    }
}

impl WidgetLayout {
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: Uuid,
    pub chart_type: ChartType,
    pub config: ChartCandidate,
    pub layout: WidgetLayout,
}

impl Widget {
    pub fn new(chart_type: ChartType, config: ChartCandidate) -> Self {
        Self {
            id: Uuid::new_v4(),
            chart_type,
            config,
            layout: WidgetLayout::default(),
        }
    }

    pub fn with_layout(mut self, layout: WidgetLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn is_renderable(&self) -> bool {
        is_config_complete(self.chart_type.as_str(), &self.config)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dashboard {
    pub widgets: Vec<Widget>,
    pub active_tab: usize,
}

impl Dashboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a widget below the existing ones and return its id.
    pub fn add_widget(&mut self, chart_type: ChartType, config: ChartCandidate) -> Uuid {
        let y = self.widgets.iter().map(|w| w.layout.bottom()).max().unwrap_or(0);
        let widget = Widget::new(chart_type, config).with_layout(WidgetLayout {
            y,
            ..WidgetLayout::default()
        });
        let id = widget.id;
        self.widgets.push(widget);
        id
    }

    pub fn widget(&self, id: Uuid) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn widget_mut(&mut self, id: Uuid) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| w.id == id)
    }

    pub fn remove_widget(&mut self, id: Uuid) -> Option<Widget> {
        let index = self.widgets.iter().position(|w| w.id == id)?;
        Some(self.widgets.remove(index))
    }

    /// Move or resize a widget. Returns false if no widget has `id`.
    pub fn set_layout(&mut self, id: Uuid, layout: WidgetLayout) -> bool {
        match self.widget_mut(id) {
            Some(widget) => {
                widget.layout = layout;
                true
            }
            None => false,
        }
    }

    /// Widgets whose configuration is complete, in dashboard order.
    pub fn renderable_widgets(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.iter().filter(|w| w.is_renderable())
    }
}
