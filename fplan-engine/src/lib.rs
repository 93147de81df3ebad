pub mod command;
pub mod history;
pub mod interaction;

pub mod errors {
    use fplan_core::plan::{DoorId, PlanError, PlumbingId, RoomId};
    use thiserror::Error;

    #[derive(Debug, Error, PartialEq)]
    pub enum EngineError {
        #[error("room {0} not found")]
        RoomNotFound(RoomId),
        #[error("door {door} not found in room {room}")]
        DoorNotFound { room: RoomId, door: DoorId },
        #[error("plumbing point {0} not found")]
        PlumbingPointNotFound(PlumbingId),
        #[error("invalid room size {width}x{height}: both sides must be positive")]
        InvalidRoomSize { width: f64, height: f64 },
        #[error(transparent)]
        Plan(#[from] PlanError),
    }
}

pub mod scene {
    use tracing::{debug, info, warn};

    use fplan_core::constraints::{self, RoomIssues};
    use fplan_core::geometry::{Point2, ViewTransform};
    use fplan_core::plan::{
        Door, DoorId, FloorPlan, PlumbingId, PlumbingPoint, Room, RoomId, RoomKind, Rotation, Wall,
    };

    use crate::errors::EngineError;
    use crate::history::History;
    use crate::interaction::{
        InputEvent, InputResponse, InteractionController, InteractionSettings, PointerTarget,
        Selection, resolve_target,
    };

    /// 新建房间的默认放置位置。
    const NEW_ROOM_ORIGIN: (f64, f64) = (100.0, 100.0);

    /// 属性面板对房间的部分更新，`None` 表示不修改该字段。
    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct RoomUpdate {
        pub label: Option<String>,
        pub kind: Option<RoomKind>,
        pub origin: Option<Point2>,
        pub size: Option<(f64, f64)>,
        pub rotation: Option<Rotation>,
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct DoorUpdate {
        pub wall: Option<Wall>,
        pub offset: Option<f64>,
        pub width: Option<f64>,
    }

    /// 编辑器外观层：持有撤销历史、选中集与交互控制器。
    ///
    /// 宿主只需把指针事件交给 [`Scene::handle_input`]，
    /// 属性面板的每次字段提交都会形成一个独立的撤销步骤。
    #[derive(Debug)]
    pub struct Scene {
        history: History<FloorPlan>,
        selection: Selection,
        controller: InteractionController,
    }

    impl Scene {
        pub fn new() -> Self {
            Self::with_settings(InteractionSettings::default(), None)
        }

        pub fn with_settings(settings: InteractionSettings, history_depth: Option<usize>) -> Self {
            Self {
                history: History::with_max_depth(FloorPlan::empty(), history_depth),
                selection: Selection::None,
                controller: InteractionController::new(settings),
            }
        }

        /// 使用现有平面图初始化场景。
        pub fn with_plan(plan: FloorPlan) -> Self {
            let mut scene = Self::new();
            scene.load_plan(plan);
            scene
        }

        /// 整体替换平面图：清空历史与选中集，终止进行中的手势。
        pub fn load_plan(&mut self, plan: FloorPlan) {
            info!(
                plan = %plan.id,
                rooms = plan.rooms().len(),
                plumbing_points = plan.plumbing_points().len(),
                "加载平面图"
            );
            self.history.reset(plan);
            self.selection = Selection::None;
            self.controller.cancel();
        }

        /// 载入内置的示例户型。
        pub fn populate_demo(&mut self) {
            self.load_plan(demo_plan());
        }

        #[inline]
        pub fn plan(&self) -> &FloorPlan {
            self.history.present()
        }

        #[inline]
        pub fn history(&self) -> &History<FloorPlan> {
            &self.history
        }

        #[inline]
        pub fn selection(&self) -> &Selection {
            &self.selection
        }

        #[inline]
        pub fn controller(&self) -> &InteractionController {
            &self.controller
        }

        #[inline]
        pub fn view(&self) -> ViewTransform {
            self.controller.view()
        }

        pub fn selected_room(&self) -> Option<&Room> {
            self.selection.room().and_then(|id| self.plan().room(id))
        }

        pub fn select_room(&mut self, id: &RoomId) -> Result<(), EngineError> {
            if self.plan().room(id).is_none() {
                return Err(EngineError::RoomNotFound(id.clone()));
            }
            self.selection = Selection::Room(id.clone());
            Ok(())
        }

        pub fn select_plumbing_point(&mut self, id: &PlumbingId) -> Result<(), EngineError> {
            if self.plan().plumbing_point(id).is_none() {
                return Err(EngineError::PlumbingPointNotFound(id.clone()));
            }
            self.selection = Selection::Plumbing(id.clone());
            Ok(())
        }

        #[inline]
        pub fn clear_selection(&mut self) {
            self.selection = Selection::None;
        }

        /// 驱动交互状态机。
        pub fn handle_input(&mut self, event: InputEvent) -> InputResponse {
            self.controller
                .handle(event, &mut self.history, &mut self.selection)
        }

        /// 将模型坐标解析为命中目标，供没有自带命中测试的宿主使用。
        pub fn hit_test(&self, point: Point2) -> PointerTarget {
            resolve_target(self.plan(), point, &self.selection)
        }

        pub fn zoom_in(&mut self) -> bool {
            self.controller.zoom_in()
        }

        pub fn zoom_out(&mut self) -> bool {
            self.controller.zoom_out()
        }

        pub fn reset_view(&mut self) {
            self.controller.reset_view();
        }

        /// 撤销一步。进行中的手势随之终止，之后的指针移动不再改写历史。
        pub fn undo(&mut self) -> bool {
            self.controller.cancel();
            let changed = self.history.undo();
            if changed {
                self.prune_selection();
            }
            changed
        }

        pub fn redo(&mut self) -> bool {
            self.controller.cancel();
            let changed = self.history.redo();
            if changed {
                self.prune_selection();
            }
            changed
        }

        #[inline]
        pub fn can_undo(&self) -> bool {
            self.history.can_undo()
        }

        #[inline]
        pub fn can_redo(&self) -> bool {
            self.history.can_redo()
        }

        /// 在 (100,100) 新建指定类型的房间并选中它。
        pub fn add_room(&mut self, kind: RoomKind) -> Result<RoomId, EngineError> {
            let id = self.edit_plan(|plan| {
                let id = plan.fresh_room_id();
                let (width, height) = kind.default_size();
                let room = Room::new(
                    id.clone(),
                    kind,
                    format!("New {kind}"),
                    Point2::new(NEW_ROOM_ORIGIN.0, NEW_ROOM_ORIGIN.1),
                    width,
                    height,
                );
                plan.insert_room(room)?;
                Ok(id)
            })?;
            debug!(room = %id, kind = %kind, "新建房间");
            self.selection = Selection::Room(id.clone());
            Ok(id)
        }

        pub fn update_room(&mut self, id: &RoomId, update: RoomUpdate) -> Result<(), EngineError> {
            if let Some((width, height)) = update.size {
                if !(width > 0.0 && height > 0.0) {
                    warn!(room = %id, width, height, "拒绝非正尺寸");
                    return Err(EngineError::InvalidRoomSize { width, height });
                }
            }
            self.edit_room(id, |room| {
                if let Some(label) = update.label {
                    room.label = label;
                }
                if let Some(kind) = update.kind {
                    room.kind = kind;
                }
                if let Some(origin) = update.origin {
                    room.set_origin(origin);
                }
                if let Some((width, height)) = update.size {
                    room.width = width;
                    room.height = height;
                }
                if let Some(rotation) = update.rotation {
                    room.rotation = rotation;
                }
                Ok(())
            })
        }

        /// 顺时针旋转 90°。
        pub fn rotate_room(&mut self, id: &RoomId) -> Result<Rotation, EngineError> {
            self.edit_room(id, |room| {
                room.rotation = room.rotation.rotated_cw();
                Ok(room.rotation)
            })
        }

        pub fn delete_room(&mut self, id: &RoomId) -> Result<Room, EngineError> {
            let removed = self.edit_plan(|plan| {
                plan.remove_room(id)
                    .ok_or_else(|| EngineError::RoomNotFound(id.clone()))
            })?;
            if self.selection.room() == Some(id) {
                self.selection = Selection::None;
            }
            Ok(removed)
        }

        pub fn add_door(&mut self, room: &RoomId) -> Result<DoorId, EngineError> {
            self.edit_plan(|plan| {
                let door_id = plan.fresh_door_id();
                let target = plan
                    .room_mut(room)
                    .ok_or_else(|| EngineError::RoomNotFound(room.clone()))?;
                target.doors.push(Door::new(door_id.clone()));
                Ok(door_id)
            })
        }

        pub fn update_door(
            &mut self,
            room: &RoomId,
            door: &DoorId,
            update: DoorUpdate,
        ) -> Result<(), EngineError> {
            self.edit_room(room, |target| {
                let Some(entry) = target.door_mut(door) else {
                    return Err(EngineError::DoorNotFound {
                        room: room.clone(),
                        door: door.clone(),
                    });
                };
                if let Some(wall) = update.wall {
                    entry.wall = wall;
                }
                if let Some(offset) = update.offset {
                    entry.offset = offset;
                }
                if let Some(width) = update.width {
                    entry.width = width;
                }
                let edited = entry.clone();
                if !edited.fits(target) {
                    debug!(room = %room, door = %door, "门洞超出墙体范围");
                }
                Ok(())
            })
        }

        pub fn delete_door(&mut self, room: &RoomId, door: &DoorId) -> Result<(), EngineError> {
            self.edit_room(room, |target| {
                let before = target.doors.len();
                target.doors.retain(|entry| &entry.id != door);
                if target.doors.len() == before {
                    return Err(EngineError::DoorNotFound {
                        room: room.clone(),
                        door: door.clone(),
                    });
                }
                Ok(())
            })
        }

        pub fn add_plumbing_point(&mut self, position: Point2) -> Result<PlumbingId, EngineError> {
            self.edit_plan(|plan| {
                let id = plan.fresh_plumbing_id();
                plan.insert_plumbing_point(PlumbingPoint::new(id.clone(), position))?;
                Ok(id)
            })
        }

        pub fn set_plumbing_position(
            &mut self,
            id: &PlumbingId,
            position: Point2,
        ) -> Result<(), EngineError> {
            self.edit_plan(|plan| {
                let point = plan
                    .plumbing_point_mut(id)
                    .ok_or_else(|| EngineError::PlumbingPointNotFound(id.clone()))?;
                point.x = position.x();
                point.y = position.y();
                Ok(())
            })
        }

        pub fn delete_plumbing_point(&mut self, id: &PlumbingId) -> Result<(), EngineError> {
            self.edit_plan(|plan| {
                plan.remove_plumbing_point(id)
                    .map(|_| ())
                    .ok_or_else(|| EngineError::PlumbingPointNotFound(id.clone()))
            })?;
            if self.selection.plumbing() == Some(id) {
                self.selection = Selection::None;
            }
            Ok(())
        }

        pub fn room_issues(&self, id: &RoomId) -> Option<RoomIssues> {
            let plan = self.plan();
            plan.room(id).map(|room| constraints::room_issues(plan, room))
        }

        pub fn validation_report(&self) -> Vec<RoomIssues> {
            constraints::validate_plan(self.plan())
        }

        /// 复制当前平面图、执行修改并以一个撤销步骤提交。出错或无变化时不产生记录。
        fn edit_plan<R>(
            &mut self,
            edit: impl FnOnce(&mut FloorPlan) -> Result<R, EngineError>,
        ) -> Result<R, EngineError> {
            let mut plan = self.history.present_cloned();
            let result = edit(&mut plan)?;
            if plan != *self.history.present() {
                self.history.commit(plan);
            }
            Ok(result)
        }

        fn edit_room<R>(
            &mut self,
            id: &RoomId,
            edit: impl FnOnce(&mut Room) -> Result<R, EngineError>,
        ) -> Result<R, EngineError> {
            self.edit_plan(|plan| {
                let room = plan
                    .room_mut(id)
                    .ok_or_else(|| EngineError::RoomNotFound(id.clone()))?;
                edit(room)
            })
        }

        /// 撤销/重做后选中的实体可能已不存在。
        fn prune_selection(&mut self) {
            let stale = match &self.selection {
                Selection::None => false,
                Selection::Room(id) => self.plan().room(id).is_none(),
                Selection::Plumbing(id) => self.plan().plumbing_point(id).is_none(),
            };
            if stale {
                self.selection = Selection::None;
            }
        }
    }

    impl Default for Scene {
        fn default() -> Self {
            Self::new()
        }
    }

    /// 示例户型：上下两个组团与中间走廊，共 24 个房间、5 个给排水点。
    pub fn demo_plan() -> FloorPlan {
        const ROOMS: [(&str, RoomKind, &str, f64, f64, f64, f64); 24] = [
            ("r1", RoomKind::Balcony, "New Balcony", 50.0, 50.0, 160.0, 60.0),
            ("r2", RoomKind::Balcony, "New Balcony", 300.0, 50.0, 100.0, 80.0),
            ("r3", RoomKind::Storage, "Dressing", 50.0, 120.0, 60.0, 100.0),
            ("r4", RoomKind::Bedroom, "Master Bed", 120.0, 120.0, 170.0, 210.0),
            ("r5", RoomKind::Toilet, "Master Bath", 50.0, 230.0, 60.0, 100.0),
            ("r5b", RoomKind::Balcony, "Balcony", 50.0, 340.0, 60.0, 200.0),
            ("r6", RoomKind::Toilet, "New Toilet", 300.0, 140.0, 60.0, 80.0),
            ("r7", RoomKind::Storage, "Store", 370.0, 140.0, 60.0, 80.0),
            ("r8", RoomKind::Kitchen, "Kitchen", 370.0, 230.0, 120.0, 140.0),
            ("r9", RoomKind::Living, "New Living", 300.0, 380.0, 190.0, 140.0),
            ("r11", RoomKind::Bedroom, "Bedroom 2", 120.0, 340.0, 170.0, 140.0),
            ("r12", RoomKind::Bedroom, "New Bedroom", 140.0, 490.0, 150.0, 120.0),
            ("r13", RoomKind::Living, "Living Room", 300.0, 530.0, 140.0, 120.0),
            ("r14", RoomKind::Corridor, "New Corridor", 100.0, 660.0, 450.0, 80.0),
            ("r15", RoomKind::Balcony, "New Balcony", 50.0, 760.0, 100.0, 80.0),
            ("r16", RoomKind::Toilet, "New Toil", 60.0, 850.0, 80.0, 60.0),
            ("r20", RoomKind::Balcony, "New Balcony", 50.0, 920.0, 100.0, 150.0),
            ("r17", RoomKind::Bedroom, "New Bedroom", 160.0, 760.0, 140.0, 140.0),
            ("r21", RoomKind::Kitchen, "New Kitchen", 160.0, 910.0, 140.0, 120.0),
            ("r23", RoomKind::Toilet, "New Toil", 310.0, 910.0, 60.0, 60.0),
            ("r24", RoomKind::Storage, "Store", 380.0, 910.0, 60.0, 60.0),
            ("r18", RoomKind::Living, "New Living", 310.0, 760.0, 180.0, 140.0),
            ("r22", RoomKind::Bedroom, "New Bedroom", 450.0, 910.0, 120.0, 120.0),
            ("r19", RoomKind::Balcony, "New Balcony", 500.0, 760.0, 60.0, 250.0),
        ];
        const PLUMBING: [(&str, f64, f64); 5] = [
            ("p1", 80.0, 250.0),
            ("p2", 330.0, 180.0),
            ("p3", 430.0, 300.0),
            ("p4", 80.0, 880.0),
            ("p5", 200.0, 950.0),
        ];

        let mut plan = FloorPlan::new("demo-complex-1", "Complex Apartment Layout", 800.0, 1200.0);
        for (id, kind, label, x, y, width, height) in ROOMS {
            let room = Room::new(RoomId::new(id), kind, label, Point2::new(x, y), width, height);
            if let Err(err) = plan.insert_room(room) {
                warn!(error = %err, "示例房间重复，已跳过");
            }
        }
        for (id, x, y) in PLUMBING {
            let point = PlumbingPoint::new(PlumbingId::new(id), Point2::new(x, y));
            if let Err(err) = plan.insert_plumbing_point(point) {
                warn!(error = %err, "示例给排水点重复，已跳过");
            }
        }
        plan
    }

}
