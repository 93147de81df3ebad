use tracing::{debug, trace, warn};

use fplan_core::geometry::{
    Bounds2D, Point2, Vector2, ViewTransform, map_pointer_to_model, snap_vector,
};
use fplan_core::plan::{FloorPlan, PlumbingId, Room, RoomId};

use crate::history::History;

/// 拖拽手柄的边长（模型单位），以房间角点为中心。
pub const HANDLE_SIZE: f64 = 16.0;
/// 给排水标记的点击半径。
pub const PLUMBING_MARKER_RADIUS: f64 = 8.0;
/// 缩放调整房间时允许的最小边长。
pub const MIN_ROOM_SIZE: f64 = 20.0;

pub const DEFAULT_ZOOM_STEP: f64 = 1.05;
pub const DEFAULT_BUTTON_ZOOM_FACTOR: f64 = 1.2;
pub const MIN_ZOOM: f64 = 0.2;
pub const MAX_ZOOM: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionSettings {
    /// 每个滚轮刻度的乘法缩放步长。
    pub zoom_step: f64,
    /// 缩放按钮的乘法因子。
    pub button_zoom_factor: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub min_room_size: f64,
}

impl InteractionSettings {
    #[inline]
    pub fn clamp_zoom(&self, zoom: f64) -> f64 {
        if zoom.is_finite() {
            zoom.clamp(self.min_zoom, self.max_zoom)
        } else {
            1.0_f64.clamp(self.min_zoom, self.max_zoom)
        }
    }
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            zoom_step: DEFAULT_ZOOM_STEP,
            button_zoom_factor: DEFAULT_BUTTON_ZOOM_FACTOR,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            min_room_size: MIN_ROOM_SIZE,
        }
    }
}

/// 选中房间四角的缩放手柄。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    NorthEast,
    NorthWest,
    SouthEast,
    SouthWest,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 4] = [
        ResizeHandle::NorthEast,
        ResizeHandle::NorthWest,
        ResizeHandle::SouthEast,
        ResizeHandle::SouthWest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResizeHandle::NorthEast => "ne",
            ResizeHandle::NorthWest => "nw",
            ResizeHandle::SouthEast => "se",
            ResizeHandle::SouthWest => "sw",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|handle| handle.name() == name)
    }

    #[inline]
    fn east(self) -> bool {
        matches!(self, ResizeHandle::NorthEast | ResizeHandle::SouthEast)
    }

    #[inline]
    fn south(self) -> bool {
        matches!(self, ResizeHandle::SouthEast | ResizeHandle::SouthWest)
    }

    /// 手柄在房间未旋转局部坐标系中的位置。
    pub fn local_corner(self, room: &Room) -> Point2 {
        let x = if self.east() { room.width } else { 0.0 };
        let y = if self.south() { room.height } else { 0.0 };
        Point2::new(x, y)
    }
}

/// 指针按下时命中的对象，由宿主或 [`resolve_target`] 给出。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    Background,
    Room(RoomId),
    Handle(RoomId, ResizeHandle),
    Plumbing(PlumbingId),
}

/// 指针的客户区坐标与画布元素原点（均为屏幕像素）。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerPosition {
    pub screen: Point2,
    pub element_origin: Point2,
}

impl PointerPosition {
    #[inline]
    pub fn new(screen: Point2, element_origin: Point2) -> Self {
        Self {
            screen,
            element_origin,
        }
    }

    /// 画布原点位于客户区 (0,0) 时的便捷构造。
    #[inline]
    pub fn at(x: f64, y: f64) -> Self {
        Self::new(Point2::new(x, y), Point2::new(0.0, 0.0))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub delta: Vector2,
    /// Ctrl / Cmd 是否按下。
    pub modifier: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown {
        pointer: PointerPosition,
        target: PointerTarget,
    },
    PointerMove {
        pointer: PointerPosition,
    },
    PointerUp,
    PointerLeave,
    Wheel(WheelEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Move,
    Resize(ResizeHandle),
}

/// 单次按下到抬起之间的拖拽会话，不会持久化。
#[derive(Debug, Clone, PartialEq)]
pub struct DragSession {
    pub room: RoomId,
    pub kind: DragKind,
    pub start_pointer: Point2,
    pub start_origin: Point2,
    pub start_size: Vector2,
}

impl DragSession {
    /// 根据模型空间位移计算候选房间，位移先吸附到网格。
    pub fn apply(&self, room: &Room, delta: Vector2, min_size: f64) -> Room {
        let snapped = snap_vector(delta);
        let mut next = room.clone();
        match self.kind {
            DragKind::Move => {
                next.set_origin(self.start_origin.translate(snapped));
            }
            DragKind::Resize(handle) => {
                let (x, width) = resize_axis(
                    self.start_origin.x(),
                    self.start_size.x(),
                    snapped.x(),
                    handle.east(),
                    min_size,
                );
                let (y, height) = resize_axis(
                    self.start_origin.y(),
                    self.start_size.y(),
                    snapped.y(),
                    handle.south(),
                    min_size,
                );
                next.x = x;
                next.y = y;
                next.width = width;
                next.height = height;
            }
        }
        next
    }
}

/// 单轴缩放：向正方向拖动时增长尺寸，向负方向拖动时移动起点并保持对边不动。
fn resize_axis(
    start: f64,
    size: f64,
    delta: f64,
    grows_forward: bool,
    min_size: f64,
) -> (f64, f64) {
    if grows_forward {
        return (start, (size + delta).max(min_size));
    }
    let proposed = size - delta;
    if proposed >= min_size {
        (start + delta, proposed)
    } else {
        (start + size - min_size, min_size)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Panning {
        last_screen: Point2,
    },
    Dragging(DragSession),
}

/// 房间与给排水点互斥选中。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Room(RoomId),
    Plumbing(PlumbingId),
}

impl Selection {
    pub fn room(&self) -> Option<&RoomId> {
        match self {
            Selection::Room(id) => Some(id),
            _ => None,
        }
    }

    pub fn plumbing(&self) -> Option<&PlumbingId> {
        match self {
            Selection::Plumbing(id) => Some(id),
            _ => None,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, Selection::None)
    }
}

/// 单个事件带来的变化，供宿主决定是否重绘。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputResponse {
    pub plan_changed: bool,
    pub view_changed: bool,
    pub selection_changed: bool,
}

impl InputResponse {
    #[inline]
    pub fn is_noop(&self) -> bool {
        !(self.plan_changed || self.view_changed || self.selection_changed)
    }
}

/// 交互控制器：`idle` / `panning` / `dragging` 显式状态机，并持有视口变换。
#[derive(Debug, Clone)]
pub struct InteractionController {
    state: InteractionState,
    view: ViewTransform,
    settings: InteractionSettings,
}

impl InteractionController {
    pub fn new(settings: InteractionSettings) -> Self {
        Self {
            state: InteractionState::Idle,
            view: ViewTransform::default(),
            settings,
        }
    }

    #[inline]
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self.state, InteractionState::Idle)
    }

    #[inline]
    pub fn view(&self) -> ViewTransform {
        self.view
    }

    #[inline]
    pub fn settings(&self) -> &InteractionSettings {
        &self.settings
    }

    pub fn set_view(&mut self, view: ViewTransform) {
        self.view = ViewTransform::new(view.pan, self.settings.clamp_zoom(view.zoom));
    }

    /// 丢弃进行中的会话，例如整体替换文档时。
    pub fn cancel(&mut self) {
        self.state = InteractionState::Idle;
    }

    /// 驱动状态机。所有事件都同步处理，未匹配当前状态的事件视为空操作。
    pub fn handle(
        &mut self,
        event: InputEvent,
        history: &mut History<FloorPlan>,
        selection: &mut Selection,
    ) -> InputResponse {
        match event {
            InputEvent::PointerDown { pointer, target } => {
                self.pointer_down(pointer, target, history, selection)
            }
            InputEvent::PointerMove { pointer } => self.pointer_move(pointer, history),
            InputEvent::PointerUp | InputEvent::PointerLeave => self.release(),
            InputEvent::Wheel(wheel) => self.wheel(wheel),
        }
    }

    fn pointer_down(
        &mut self,
        pointer: PointerPosition,
        target: PointerTarget,
        history: &mut History<FloorPlan>,
        selection: &mut Selection,
    ) -> InputResponse {
        let (room_id, kind) = match target {
            PointerTarget::Background => {
                self.state = InteractionState::Panning {
                    last_screen: pointer.screen,
                };
                return InputResponse {
                    selection_changed: replace_selection(selection, Selection::None),
                    ..InputResponse::default()
                };
            }
            PointerTarget::Plumbing(id) => {
                if history.present().plumbing_point(&id).is_none() {
                    warn!(plumbing = %id, "点击的给排水点不存在");
                    return InputResponse::default();
                }
                self.state = InteractionState::Idle;
                return InputResponse {
                    selection_changed: replace_selection(selection, Selection::Plumbing(id)),
                    ..InputResponse::default()
                };
            }
            PointerTarget::Room(id) => (id, DragKind::Move),
            PointerTarget::Handle(id, handle) => (id, DragKind::Resize(handle)),
        };

        let Some(room) = history.present().room(&room_id) else {
            warn!(room = %room_id, "拖拽目标房间不存在");
            return InputResponse::default();
        };
        let session = DragSession {
            room: room_id.clone(),
            kind,
            start_pointer: map_pointer_to_model(pointer.screen, pointer.element_origin, &self.view),
            start_origin: room.origin(),
            start_size: room.size(),
        };

        history.snapshot();
        debug!(room = %room_id, kind = ?kind, "开始拖拽");
        self.state = InteractionState::Dragging(session);
        InputResponse {
            selection_changed: replace_selection(selection, Selection::Room(room_id)),
            ..InputResponse::default()
        }
    }

    fn pointer_move(
        &mut self,
        pointer: PointerPosition,
        history: &mut History<FloorPlan>,
    ) -> InputResponse {
        match &mut self.state {
            InteractionState::Idle => {
                trace!("无活动会话，忽略指针移动");
                InputResponse::default()
            }
            InteractionState::Panning { last_screen } => {
                let delta = last_screen.vector_to(pointer.screen);
                *last_screen = pointer.screen;
                self.view.pan = Vector2::from(self.view.pan.as_vec2() + delta.as_vec2());
                InputResponse {
                    view_changed: delta != Vector2::ZERO,
                    ..InputResponse::default()
                }
            }
            InteractionState::Dragging(session) => {
                let current =
                    map_pointer_to_model(pointer.screen, pointer.element_origin, &self.view);
                let delta = session.start_pointer.vector_to(current);
                let plan = history.present();
                let Some(room) = plan.room(&session.room) else {
                    warn!(room = %session.room, "拖拽中的房间已被移除，结束会话");
                    self.state = InteractionState::Idle;
                    return InputResponse::default();
                };
                let next = session.apply(room, delta, self.settings.min_room_size);
                if &next == room {
                    return InputResponse::default();
                }

                let mut updated = plan.clone();
                if let Some(slot) = updated.room_mut(&session.room) {
                    *slot = next;
                }
                history.commit_overwrite(updated);
                InputResponse {
                    plan_changed: true,
                    ..InputResponse::default()
                }
            }
        }
    }

    fn release(&mut self) -> InputResponse {
        if let InteractionState::Dragging(session) = &self.state {
            debug!(room = %session.room, "拖拽结束");
        }
        self.state = InteractionState::Idle;
        InputResponse::default()
    }

    fn wheel(&mut self, wheel: WheelEvent) -> InputResponse {
        let before = self.view;
        if wheel.modifier {
            let zoom = if wheel.delta.y() > 0.0 {
                self.view.zoom / self.settings.zoom_step
            } else {
                self.view.zoom * self.settings.zoom_step
            };
            self.view.zoom = self.settings.clamp_zoom(zoom);
        } else {
            self.view.pan = Vector2::from(self.view.pan.as_vec2() + wheel.delta.as_vec2());
        }
        InputResponse {
            view_changed: self.view != before,
            ..InputResponse::default()
        }
    }

    pub fn zoom_in(&mut self) -> bool {
        self.scale_zoom(self.settings.button_zoom_factor)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.scale_zoom(1.0 / self.settings.button_zoom_factor)
    }

    fn scale_zoom(&mut self, factor: f64) -> bool {
        let before = self.view.zoom;
        self.view.zoom = self.settings.clamp_zoom(before * factor);
        self.view.zoom != before
    }

    pub fn reset_view(&mut self) {
        self.view = ViewTransform::new(Vector2::ZERO, self.settings.clamp_zoom(1.0));
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(InteractionSettings::default())
    }
}

fn replace_selection(selection: &mut Selection, next: Selection) -> bool {
    if *selection == next {
        return false;
    }
    *selection = next;
    true
}

/// 按绘制层级做命中测试：选中房间的手柄 > 房间（后绘制者在上） > 给排水点 > 背景。
pub fn resolve_target(plan: &FloorPlan, point: Point2, selection: &Selection) -> PointerTarget {
    let half = HANDLE_SIZE / 2.0;
    if let Some(room) = selection.room().and_then(|id| plan.room(id)) {
        let local = room.to_local(point);
        for handle in ResizeHandle::ALL {
            let corner = handle.local_corner(room);
            if (local.x() - corner.x()).abs() <= half && (local.y() - corner.y()).abs() <= half {
                return PointerTarget::Handle(room.id.clone(), handle);
            }
        }
    }

    for room in plan.rooms().iter().rev() {
        let local_rect =
            Bounds2D::from_origin_size(Point2::new(0.0, 0.0), room.width, room.height);
        if local_rect.contains(room.to_local(point)) {
            return PointerTarget::Room(room.id.clone());
        }
    }

    for marker in plan.plumbing_points().iter().rev() {
        if marker.position().distance(point) <= PLUMBING_MARKER_RADIUS {
            return PointerTarget::Plumbing(marker.id.clone());
        }
    }

    PointerTarget::Background
}
