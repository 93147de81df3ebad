pub mod geometry {
    use glam::DVec2;
    use serde::{Deserialize, Serialize};

    /// 网格步长（单位：网格单位）。所有拖拽与缩放后的坐标都吸附到该步长的整数倍。
    pub const GRID_SIZE: f64 = 10.0;

    /// 二维点，内部以 `glam::DVec2` 表示。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Point2(pub DVec2);

    impl Point2 {
        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_vec(vec: DVec2) -> Self {
            Self(vec)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn translate(self, offset: Vector2) -> Self {
            Self(self.0 + offset.0)
        }

        #[inline]
        pub fn vector_to(self, other: Point2) -> Vector2 {
            Vector2(other.0 - self.0)
        }

        #[inline]
        pub fn distance(self, other: Point2) -> f64 {
            self.0.distance(other.0)
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Point2 {
        fn from(value: DVec2) -> Self {
            Self::from_vec(value)
        }
    }

    /// 二维向量，用于表示拖拽位移与视口平移。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Vector2(pub DVec2);

    impl Vector2 {
        pub const ZERO: Vector2 = Vector2(DVec2::ZERO);

        #[inline]
        pub fn new(x: f64, y: f64) -> Self {
            Self(DVec2::new(x, y))
        }

        #[inline]
        pub fn from_points(start: Point2, end: Point2) -> Self {
            Self(end.0 - start.0)
        }

        #[inline]
        pub fn x(self) -> f64 {
            self.0.x
        }

        #[inline]
        pub fn y(self) -> f64 {
            self.0.y
        }

        #[inline]
        pub fn length(self) -> f64 {
            self.0.length()
        }

        #[inline]
        pub fn as_vec2(self) -> DVec2 {
            self.0
        }
    }

    impl From<DVec2> for Vector2 {
        fn from(value: DVec2) -> Self {
            Self(value)
        }
    }

    /// 轴对齐边界框，用于房间范围、门洞投影与导出尺寸估算。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct Bounds2D {
        min: Point2,
        max: Point2,
    }

    impl Bounds2D {
        #[inline]
        pub fn new(min: Point2, max: Point2) -> Self {
            Self { min, max }
        }

        /// 由左上角与宽高构造。
        #[inline]
        pub fn from_origin_size(origin: Point2, width: f64, height: f64) -> Self {
            Self {
                min: origin,
                max: Point2::new(origin.x() + width, origin.y() + height),
            }
        }

        #[inline]
        pub fn empty() -> Self {
            Self {
                min: Point2::new(f64::INFINITY, f64::INFINITY),
                max: Point2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            }
        }

        #[inline]
        pub fn is_empty(&self) -> bool {
            self.min.x() > self.max.x() || self.min.y() > self.max.y()
        }

        #[inline]
        pub fn min(&self) -> Point2 {
            self.min
        }

        #[inline]
        pub fn max(&self) -> Point2 {
            self.max
        }

        #[inline]
        pub fn width(&self) -> f64 {
            self.max.x() - self.min.x()
        }

        #[inline]
        pub fn height(&self) -> f64 {
            self.max.y() - self.min.y()
        }

        pub fn include_point(&mut self, point: Point2) {
            if self.is_empty() {
                self.min = point;
                self.max = point;
                return;
            }
            let min_vec = self.min.as_vec2().min(point.as_vec2());
            let max_vec = self.max.as_vec2().max(point.as_vec2());
            self.min = Point2::from_vec(min_vec);
            self.max = Point2::from_vec(max_vec);
        }

        pub fn include_bounds(&mut self, other: &Bounds2D) {
            if other.is_empty() {
                return;
            }
            self.include_point(other.min);
            self.include_point(other.max);
        }

        /// 闭区间包含判定，边界上的点视为包含。
        #[inline]
        pub fn contains(&self, point: Point2) -> bool {
            point.x() >= self.min.x()
                && point.x() <= self.max.x()
                && point.y() >= self.min.y()
                && point.y() <= self.max.y()
        }

        #[inline]
        pub fn center(&self) -> Point2 {
            debug_assert!(!self.is_empty());
            let center = (self.min.as_vec2() + self.max.as_vec2()) * 0.5;
            Point2::from_vec(center)
        }
    }

    /// 视口变换：先缩放再平移，平移量以屏幕像素计。
    ///
    /// 渲染时对模型内容施加 `translate(pan) scale(zoom)`，
    /// [`map_pointer_to_model`] 是它的精确逆变换。
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct ViewTransform {
        pub pan: Vector2,
        pub zoom: f64,
    }

    impl ViewTransform {
        #[inline]
        pub fn new(pan: Vector2, zoom: f64) -> Self {
            Self { pan, zoom }
        }

        /// 模型坐标 → 元素内屏幕偏移。
        #[inline]
        pub fn model_to_screen(&self, model: Point2) -> Point2 {
            Point2::from_vec(model.as_vec2() * self.zoom + self.pan.as_vec2())
        }

        /// 元素内屏幕偏移 → 模型坐标。
        #[inline]
        pub fn screen_to_model(&self, screen: Point2) -> Point2 {
            Point2::from_vec((screen.as_vec2() - self.pan.as_vec2()) / self.zoom)
        }
    }

    impl Default for ViewTransform {
        fn default() -> Self {
            Self {
                pan: Vector2::ZERO,
                zoom: 1.0,
            }
        }
    }

    /// 吸附到最近的网格点，半格向正方向取整。
    #[inline]
    pub fn snap_to_grid(value: f64) -> f64 {
        round_half_up(value / GRID_SIZE) * GRID_SIZE
    }

    /// 四舍五入到整数，恰好半数时向正无穷取整。
    pub(crate) fn round_half_up(value: f64) -> f64 {
        let rounded = value.round();
        // `round` 的半数远离零，负半数需要回调。
        if rounded - value == -0.5 {
            rounded + 1.0
        } else {
            rounded
        }
    }

    #[inline]
    pub fn snap_vector(delta: Vector2) -> Vector2 {
        Vector2::new(snap_to_grid(delta.x()), snap_to_grid(delta.y()))
    }

    /// 将指针的客户区坐标映射到模型坐标：`(screen - origin - pan) / zoom`。
    pub fn map_pointer_to_model(
        pointer: Point2,
        element_origin: Point2,
        view: &ViewTransform,
    ) -> Point2 {
        let offset = Point2::from_vec(pointer.as_vec2() - element_origin.as_vec2());
        view.screen_to_model(offset)
    }
}

pub mod plan {
    use std::fmt;

    use serde::{Deserialize, Serialize};
    use thiserror::Error;

    use crate::geometry::{Bounds2D, Point2, Vector2};

    /// 墙体厚度（9 英寸），门洞投影沿墙居中占据该厚度。
    pub const WALL_THICKNESS: f64 = 7.5;

    macro_rules! string_id {
        ($(#[$meta:meta])* $name:ident) => {
            $(#[$meta])*
            #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(String);

            impl $name {
                #[inline]
                pub fn new(raw: impl Into<String>) -> Self {
                    Self(raw.into())
                }

                #[inline]
                pub fn as_str(&self) -> &str {
                    &self.0
                }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl From<&str> for $name {
                fn from(value: &str) -> Self {
                    Self::new(value)
                }
            }
        };
    }

    string_id!(
        /// 房间 ID，持久化后保持稳定。
        RoomId
    );
    string_id!(DoorId);
    string_id!(PlumbingId);

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum RoomKind {
        Bedroom,
        Toilet,
        Kitchen,
        Living,
        Balcony,
        Storage,
        Corridor,
    }

    impl RoomKind {
        pub const ALL: [RoomKind; 7] = [
            RoomKind::Bedroom,
            RoomKind::Toilet,
            RoomKind::Kitchen,
            RoomKind::Living,
            RoomKind::Balcony,
            RoomKind::Storage,
            RoomKind::Corridor,
        ];

        /// 湿区（卫生间、厨房）需要靠近给排水点。
        #[inline]
        pub fn requires_plumbing(self) -> bool {
            matches!(self, RoomKind::Toilet | RoomKind::Kitchen)
        }

        /// 新建房间的默认尺寸 `(width, height)`。
        pub fn default_size(self) -> (f64, f64) {
            match self {
                RoomKind::Toilet => (60.0, 60.0),
                _ => (120.0, 120.0),
            }
        }

        pub fn name(self) -> &'static str {
            match self {
                RoomKind::Bedroom => "bedroom",
                RoomKind::Toilet => "toilet",
                RoomKind::Kitchen => "kitchen",
                RoomKind::Living => "living",
                RoomKind::Balcony => "balcony",
                RoomKind::Storage => "storage",
                RoomKind::Corridor => "corridor",
            }
        }

        pub fn parse(name: &str) -> Option<Self> {
            Self::ALL
                .into_iter()
                .find(|kind| kind.name().eq_ignore_ascii_case(name))
        }
    }

    impl fmt::Display for RoomKind {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str(self.name())
        }
    }

    /// 房间绕自身中心的旋转角，仅允许 90° 的整数倍。
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(try_from = "f64", into = "u16")]
    pub enum Rotation {
        #[default]
        Deg0,
        Deg90,
        Deg180,
        Deg270,
    }

    impl Rotation {
        #[inline]
        pub fn degrees(self) -> u16 {
            match self {
                Rotation::Deg0 => 0,
                Rotation::Deg90 => 90,
                Rotation::Deg180 => 180,
                Rotation::Deg270 => 270,
            }
        }

        /// 接受任意 90° 的整数倍（含负值与超过一周的值），其余返回 `None`。
        pub fn from_degrees(degrees: f64) -> Option<Self> {
            if !degrees.is_finite() || degrees % 90.0 != 0.0 {
                return None;
            }
            let quarter_turns = (degrees / 90.0).rem_euclid(4.0) as u8;
            Some(match quarter_turns {
                0 => Rotation::Deg0,
                1 => Rotation::Deg90,
                2 => Rotation::Deg180,
                _ => Rotation::Deg270,
            })
        }

        #[inline]
        pub fn rotated_cw(self) -> Self {
            match self {
                Rotation::Deg0 => Rotation::Deg90,
                Rotation::Deg90 => Rotation::Deg180,
                Rotation::Deg180 => Rotation::Deg270,
                Rotation::Deg270 => Rotation::Deg0,
            }
        }

        /// 90° 或 270°：包围盒的宽高互换。
        #[inline]
        pub fn is_quarter_turn(self) -> bool {
            matches!(self, Rotation::Deg90 | Rotation::Deg270)
        }
    }

    impl TryFrom<f64> for Rotation {
        type Error = String;

        fn try_from(value: f64) -> Result<Self, Self::Error> {
            Rotation::from_degrees(value)
                .ok_or_else(|| format!("rotation must be a multiple of 90 degrees, got {value}"))
        }
    }

    impl From<Rotation> for u16 {
        fn from(value: Rotation) -> Self {
            value.degrees()
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(rename_all = "lowercase")]
    pub enum Wall {
        Top,
        Right,
        Bottom,
        Left,
    }

    impl Wall {
        pub const ALL: [Wall; 4] = [Wall::Top, Wall::Right, Wall::Bottom, Wall::Left];

        /// 按墙名解析，忽略大小写。
        pub fn parse(name: &str) -> Option<Self> {
            Self::ALL
                .into_iter()
                .find(|wall| wall.name().eq_ignore_ascii_case(name))
        }

        pub fn name(self) -> &'static str {
            match self {
                Wall::Top => "top",
                Wall::Right => "right",
                Wall::Bottom => "bottom",
                Wall::Left => "left",
            }
        }
    }

    /// 门洞，锚定在房间未旋转局部坐标系的某面墙上。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Door {
        pub id: DoorId,
        pub wall: Wall,
        pub offset: f64,
        pub width: f64,
    }

    impl Door {
        pub const DEFAULT_OFFSET: f64 = 10.0;
        pub const DEFAULT_WIDTH: f64 = 30.0;

        /// 上墙、偏移 10、宽 30（3 英尺）的默认门洞。
        pub fn new(id: DoorId) -> Self {
            Self {
                id,
                wall: Wall::Top,
                offset: Self::DEFAULT_OFFSET,
                width: Self::DEFAULT_WIDTH,
            }
        }

        #[inline]
        pub fn wall_length(&self, room: &Room) -> f64 {
            match self.wall {
                Wall::Top | Wall::Bottom => room.width,
                Wall::Left | Wall::Right => room.height,
            }
        }

        /// 门洞是否完整落在所在墙上。仅作提示，不做强制。
        pub fn fits(&self, room: &Room) -> bool {
            self.offset >= 0.0 && self.offset + self.width <= self.wall_length(room)
        }

        /// 门洞在房间局部坐标系中的矩形，随房间尺寸实时推导。
        pub fn local_rect(&self, room: &Room) -> Bounds2D {
            let half = WALL_THICKNESS / 2.0;
            let (origin, width, height) = match self.wall {
                Wall::Top => (Point2::new(self.offset, -half), self.width, WALL_THICKNESS),
                Wall::Bottom => (
                    Point2::new(self.offset, room.height - half),
                    self.width,
                    WALL_THICKNESS,
                ),
                Wall::Left => (Point2::new(-half, self.offset), WALL_THICKNESS, self.width),
                Wall::Right => (
                    Point2::new(room.width - half, self.offset),
                    WALL_THICKNESS,
                    self.width,
                ),
            };
            Bounds2D::from_origin_size(origin, width, height)
        }
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct Room {
        pub id: RoomId,
        #[serde(rename = "type")]
        pub kind: RoomKind,
        #[serde(default)]
        pub label: String,
        pub x: f64,
        pub y: f64,
        pub width: f64,
        pub height: f64,
        #[serde(default)]
        pub rotation: Rotation,
        #[serde(default)]
        pub doors: Vec<Door>,
    }

    impl Room {
        pub fn new(
            id: RoomId,
            kind: RoomKind,
            label: impl Into<String>,
            origin: Point2,
            width: f64,
            height: f64,
        ) -> Self {
            Self {
                id,
                kind,
                label: label.into(),
                x: origin.x(),
                y: origin.y(),
                width,
                height,
                rotation: Rotation::Deg0,
                doors: Vec::new(),
            }
        }

        #[inline]
        pub fn origin(&self) -> Point2 {
            Point2::new(self.x, self.y)
        }

        #[inline]
        pub fn set_origin(&mut self, origin: Point2) {
            self.x = origin.x();
            self.y = origin.y();
        }

        #[inline]
        pub fn size(&self) -> Vector2 {
            Vector2::new(self.width, self.height)
        }

        #[inline]
        pub fn center(&self) -> Point2 {
            Point2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
        }

        /// 未旋转的占地矩形。
        #[inline]
        pub fn footprint(&self) -> Bounds2D {
            Bounds2D::from_origin_size(self.origin(), self.width, self.height)
        }

        /// 考虑旋转后的轴对齐包围盒：四分之一圈时绕中心交换宽高。
        pub fn effective_bounds(&self) -> Bounds2D {
            if !self.rotation.is_quarter_turn() {
                return self.footprint();
            }
            let center = self.center();
            let half_w = self.height / 2.0;
            let half_h = self.width / 2.0;
            Bounds2D::new(
                Point2::new(center.x() - half_w, center.y() - half_h),
                Point2::new(center.x() + half_w, center.y() + half_h),
            )
        }

        /// 将模型坐标转换到房间未旋转的局部坐标（原点为左上角）。
        pub fn to_local(&self, point: Point2) -> Point2 {
            let center = self.center();
            let dx = point.x() - center.x();
            let dy = point.y() - center.y();
            let (lx, ly) = match self.rotation {
                Rotation::Deg0 => (dx, dy),
                Rotation::Deg90 => (dy, -dx),
                Rotation::Deg180 => (-dx, -dy),
                Rotation::Deg270 => (-dy, dx),
            };
            Point2::new(lx + self.width / 2.0, ly + self.height / 2.0)
        }

        pub fn door(&self, id: &DoorId) -> Option<&Door> {
            self.doors.iter().find(|door| &door.id == id)
        }

        pub fn door_mut(&mut self, id: &DoorId) -> Option<&mut Door> {
            self.doors.iter_mut().find(|door| &door.id == id)
        }
    }

    /// 固定的给排水立管位置，拖拽交互不会修改它。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    pub struct PlumbingPoint {
        pub id: PlumbingId,
        pub x: f64,
        pub y: f64,
    }

    impl PlumbingPoint {
        pub fn new(id: PlumbingId, position: Point2) -> Self {
            Self {
                id,
                x: position.x(),
                y: position.y(),
            }
        }

        #[inline]
        pub fn position(&self) -> Point2 {
            Point2::new(self.x, self.y)
        }
    }

    #[derive(Debug, Error, PartialEq)]
    pub enum PlanError {
        #[error("duplicate room id {0}")]
        DuplicateRoom(RoomId),
        #[error("duplicate door id {door} in room {room}")]
        DuplicateDoor { room: RoomId, door: DoorId },
        #[error("duplicate plumbing point id {0}")]
        DuplicatePlumbingPoint(PlumbingId),
        #[error("room {id} has non-positive size {width}x{height}")]
        InvalidRoomSize { id: RoomId, width: f64, height: f64 },
    }

    /// 平面图：房间与给排水点的集合，实体之间只通过 ID 互相引用。
    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct FloorPlan {
        #[serde(default = "FloorPlan::default_id")]
        pub id: String,
        #[serde(default = "FloorPlan::default_name")]
        pub name: String,
        #[serde(default = "FloorPlan::default_width")]
        pub width: f64,
        #[serde(default = "FloorPlan::default_height")]
        pub height: f64,
        rooms: Vec<Room>,
        #[serde(default)]
        plumbing_points: Vec<PlumbingPoint>,
    }

    impl FloorPlan {
        fn default_id() -> String {
            "empty".to_string()
        }

        fn default_name() -> String {
            "New Project".to_string()
        }

        fn default_width() -> f64 {
            800.0
        }

        fn default_height() -> f64 {
            1200.0
        }

        pub fn new(id: impl Into<String>, name: impl Into<String>, width: f64, height: f64) -> Self {
            Self {
                id: id.into(),
                name: name.into(),
                width,
                height,
                rooms: Vec::new(),
                plumbing_points: Vec::new(),
            }
        }

        /// 空白项目（800×1200）。
        pub fn empty() -> Self {
            Self::new(
                Self::default_id(),
                Self::default_name(),
                Self::default_width(),
                Self::default_height(),
            )
        }

        /// 按绘制顺序返回房间，靠后的房间位于上层。
        #[inline]
        pub fn rooms(&self) -> &[Room] {
            &self.rooms
        }

        pub fn room(&self, id: &RoomId) -> Option<&Room> {
            self.rooms.iter().find(|room| &room.id == id)
        }

        pub fn room_mut(&mut self, id: &RoomId) -> Option<&mut Room> {
            self.rooms.iter_mut().find(|room| &room.id == id)
        }

        pub fn insert_room(&mut self, room: Room) -> Result<(), PlanError> {
            if self.room(&room.id).is_some() {
                return Err(PlanError::DuplicateRoom(room.id));
            }
            self.rooms.push(room);
            Ok(())
        }

        pub fn remove_room(&mut self, id: &RoomId) -> Option<Room> {
            let index = self.rooms.iter().position(|room| &room.id == id)?;
            Some(self.rooms.remove(index))
        }

        #[inline]
        pub fn plumbing_points(&self) -> &[PlumbingPoint] {
            &self.plumbing_points
        }

        pub fn plumbing_point(&self, id: &PlumbingId) -> Option<&PlumbingPoint> {
            self.plumbing_points.iter().find(|point| &point.id == id)
        }

        pub fn plumbing_point_mut(&mut self, id: &PlumbingId) -> Option<&mut PlumbingPoint> {
            self.plumbing_points.iter_mut().find(|point| &point.id == id)
        }

        pub fn insert_plumbing_point(&mut self, point: PlumbingPoint) -> Result<(), PlanError> {
            if self.plumbing_point(&point.id).is_some() {
                return Err(PlanError::DuplicatePlumbingPoint(point.id));
            }
            self.plumbing_points.push(point);
            Ok(())
        }

        pub fn remove_plumbing_point(&mut self, id: &PlumbingId) -> Option<PlumbingPoint> {
            let index = self
                .plumbing_points
                .iter()
                .position(|point| &point.id == id)?;
            Some(self.plumbing_points.remove(index))
        }

        pub fn fresh_room_id(&self) -> RoomId {
            let id = fresh_id("room", self.rooms.len(), |candidate| {
                self.rooms.iter().any(|room| room.id.as_str() == candidate)
            });
            RoomId::new(id)
        }

        /// 门 ID 在整张平面图范围内保持唯一。
        pub fn fresh_door_id(&self) -> DoorId {
            let doors = || self.rooms.iter().flat_map(|room| room.doors.iter());
            let id = fresh_id("door", doors().count(), |candidate| {
                doors().any(|door| door.id.as_str() == candidate)
            });
            DoorId::new(id)
        }

        pub fn fresh_plumbing_id(&self) -> PlumbingId {
            let id = fresh_id("plumbing", self.plumbing_points.len(), |candidate| {
                self.plumbing_points
                    .iter()
                    .any(|point| point.id.as_str() == candidate)
            });
            PlumbingId::new(id)
        }

        /// 所有房间旋转后包围盒的并集，供导出与适配视图使用。
        pub fn content_bounds(&self) -> Option<Bounds2D> {
            if self.rooms.is_empty() {
                return None;
            }
            let mut bounds = Bounds2D::empty();
            for room in &self.rooms {
                bounds.include_bounds(&room.effective_bounds());
            }
            Some(bounds)
        }

        /// 校验反序列化得到的数据：ID 唯一、房间尺寸为正。
        pub fn check_integrity(&self) -> Result<(), PlanError> {
            for (index, room) in self.rooms.iter().enumerate() {
                if self.rooms[..index].iter().any(|other| other.id == room.id) {
                    return Err(PlanError::DuplicateRoom(room.id.clone()));
                }
                if !(room.width > 0.0 && room.height > 0.0) {
                    return Err(PlanError::InvalidRoomSize {
                        id: room.id.clone(),
                        width: room.width,
                        height: room.height,
                    });
                }
                for (door_index, door) in room.doors.iter().enumerate() {
                    if room.doors[..door_index].iter().any(|other| other.id == door.id) {
                        return Err(PlanError::DuplicateDoor {
                            room: room.id.clone(),
                            door: door.id.clone(),
                        });
                    }
                }
            }
            for (index, point) in self.plumbing_points.iter().enumerate() {
                if self.plumbing_points[..index]
                    .iter()
                    .any(|other| other.id == point.id)
                {
                    return Err(PlanError::DuplicatePlumbingPoint(point.id.clone()));
                }
            }
            Ok(())
        }
    }

    impl Default for FloorPlan {
        fn default() -> Self {
            Self::empty()
        }
    }

    fn fresh_id(prefix: &str, count: usize, taken: impl Fn(&str) -> bool) -> String {
        let mut n = count + 1;
        loop {
            let candidate = format!("{prefix}-{n}");
            if !taken(&candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

pub mod constraints {
    use crate::geometry::Bounds2D;
    use crate::plan::{FloorPlan, PlumbingPoint, Room, RoomId};

    /// 湿区房间中心到最近给排水点的最大允许距离。
    pub const PLUMBING_TOLERANCE: f64 = 150.0;

    /// 两个房间未旋转占地矩形的严格相交判定，仅共边不算重叠。
    ///
    /// 目前不考虑旋转：旋转 90° 的房间仍按原始宽高比较。
    pub fn check_overlap(a: &Room, b: &Room) -> bool {
        a.x < b.x + b.width && a.x + a.width > b.x && a.y < b.y + b.height && a.y + a.height > b.y
    }

    #[inline]
    pub fn effective_bounds(room: &Room) -> Bounds2D {
        room.effective_bounds()
    }

    #[inline]
    pub fn distance_to_point(room: &Room, point: &PlumbingPoint) -> f64 {
        room.center().distance(point.position())
    }

    /// 非湿区恒为真；未配置任何给排水点时同样视为满足。
    pub fn is_plumbing_valid(room: &Room, points: &[PlumbingPoint]) -> bool {
        if !room.kind.requires_plumbing() || points.is_empty() {
            return true;
        }
        points
            .iter()
            .any(|point| distance_to_point(room, point) <= PLUMBING_TOLERANCE)
    }

    /// 单个房间的校验结果。
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct RoomIssues {
        pub room: Option<RoomId>,
        pub overlapping: Vec<RoomId>,
        pub plumbing_out_of_range: bool,
    }

    impl RoomIssues {
        #[inline]
        pub fn has_errors(&self) -> bool {
            !self.overlapping.is_empty() || self.plumbing_out_of_range
        }
    }

    pub fn room_issues(plan: &FloorPlan, room: &Room) -> RoomIssues {
        let overlapping = plan
            .rooms()
            .iter()
            .filter(|other| other.id != room.id && check_overlap(room, other))
            .map(|other| other.id.clone())
            .collect();
        RoomIssues {
            room: Some(room.id.clone()),
            overlapping,
            plumbing_out_of_range: !is_plumbing_valid(room, plan.plumbing_points()),
        }
    }

    /// 返回存在问题的房间，顺序与绘制顺序一致。
    pub fn validate_plan(plan: &FloorPlan) -> Vec<RoomIssues> {
        plan.rooms()
            .iter()
            .map(|room| room_issues(plan, room))
            .filter(RoomIssues::has_errors)
            .collect()
    }
}

pub mod units {
    /// 10 个网格单位折合 1 英尺，仅用于显示。
    pub const UNITS_PER_FOOT: f64 = 10.0;

    #[inline]
    pub fn to_feet(units: f64) -> f64 {
        units / UNITS_PER_FOOT
    }

    pub fn format_feet(units: f64) -> String {
        format!("{:.1}'", to_feet(units))
    }

    pub fn format_dimensions(width: f64, height: f64) -> String {
        format!("{} x {}", format_feet(width), format_feet(height))
    }

    pub fn format_area(width: f64, height: f64) -> String {
        format!("{:.1} sqft", to_feet(width) * to_feet(height))
    }
}

#[cfg(test)]
mod tests {
    use super::constraints::*;
    use super::geometry::*;
    use super::plan::*;
    use super::units::*;

    fn room(id: &str, kind: RoomKind, x: f64, y: f64, w: f64, h: f64) -> Room {
        Room::new(RoomId::new(id), kind, id, Point2::new(x, y), w, h)
    }

    fn point(id: &str, x: f64, y: f64) -> PlumbingPoint {
        PlumbingPoint::new(PlumbingId::new(id), Point2::new(x, y))
    }

    #[test]
    fn snap_is_idempotent_and_grid_aligned() {
        let samples = [
            -1234.5, -15.0, -5.0, -4.9, -0.1, 0.0, 0.1, 4.9, 5.0, 14.99, 15.0, 99.5, 1234.56,
        ];
        for value in samples {
            let snapped = snap_to_grid(value);
            assert_eq!(snap_to_grid(snapped), snapped, "snap({value}) not idempotent");
            assert_eq!((snapped / GRID_SIZE).fract(), 0.0, "snap({value}) = {snapped}");
        }
        assert_eq!(snap_to_grid(14.0), 10.0);
        assert_eq!(snap_to_grid(15.0), 20.0);
        assert_eq!(snap_to_grid(-14.0), -10.0);
        assert_eq!(snap_to_grid(-15.0), -10.0);
        assert_eq!(snap_to_grid(-25.0), -20.0);
        assert_eq!(snap_to_grid(25.0), 30.0);
    }

    #[test]
    fn half_up_rounding_matches_browser_round() {
        assert_eq!(round_half_up(0.49999999999999994), 0.0);
        assert_eq!(round_half_up(0.5), 1.0);
        assert_eq!(round_half_up(-0.5), 0.0);
        assert_eq!(round_half_up(-1.5), -1.0);
        assert_eq!(round_half_up(-1.50000000000001), -2.0);
        assert_eq!(round_half_up(2.4999), 2.0);
    }

    #[test]
    fn overlap_is_symmetric_and_ignores_shared_edges() {
        let a = room("a", RoomKind::Bedroom, 0.0, 0.0, 100.0, 100.0);
        let touching = room("b", RoomKind::Living, 100.0, 0.0, 50.0, 50.0);
        let inside = room("c", RoomKind::Storage, 90.0, 90.0, 50.0, 50.0);
        let below = room("d", RoomKind::Corridor, 0.0, 100.0, 100.0, 20.0);

        assert!(!check_overlap(&a, &touching));
        assert!(!check_overlap(&touching, &a));
        assert!(!check_overlap(&a, &below));
        assert!(check_overlap(&a, &inside));
        assert!(check_overlap(&inside, &a));
    }

    #[test]
    fn overlap_uses_unrotated_footprint() {
        // 宽 200 高 20 的走廊旋转 90° 后视觉上是竖条，但判定仍使用横向的原始矩形。
        let mut corridor = room("c", RoomKind::Corridor, 0.0, 90.0, 200.0, 20.0);
        corridor.rotation = Rotation::Deg90;
        let neighbour = room("n", RoomKind::Bedroom, 150.0, 90.0, 40.0, 20.0);

        let rotated = corridor.effective_bounds();
        assert!(rotated.max().x() < neighbour.x);
        assert!(check_overlap(&corridor, &neighbour));
    }

    #[test]
    fn plumbing_rules_apply_only_to_wet_rooms() {
        let toilet = room("t", RoomKind::Toilet, 0.0, 0.0, 60.0, 60.0);
        assert!(is_plumbing_valid(&toilet, &[]));

        let at_tolerance = point("p", 30.0 + PLUMBING_TOLERANCE, 30.0);
        assert!(is_plumbing_valid(&toilet, &[at_tolerance]));

        let beyond = point("p", 30.0 + PLUMBING_TOLERANCE + 1e-6, 30.0);
        assert!(!is_plumbing_valid(&toilet, &[beyond.clone()]));

        let bedroom = room("b", RoomKind::Bedroom, 0.0, 0.0, 60.0, 60.0);
        assert!(is_plumbing_valid(&bedroom, &[beyond]));
    }

    #[test]
    fn distance_is_measured_from_room_center() {
        let kitchen = room("k", RoomKind::Kitchen, 100.0, 100.0, 120.0, 120.0);
        let p = point("p", 160.0, 200.0);
        assert!((distance_to_point(&kitchen, &p) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn effective_bounds_swap_on_quarter_turns() {
        let mut r = room("r", RoomKind::Living, 0.0, 0.0, 100.0, 40.0);
        assert_eq!(r.effective_bounds(), r.footprint());

        r.rotation = Rotation::Deg90;
        let bounds = r.effective_bounds();
        assert_eq!(bounds.min(), Point2::new(30.0, -30.0));
        assert_eq!(bounds.max(), Point2::new(70.0, 70.0));

        r.rotation = Rotation::Deg180;
        assert_eq!(r.effective_bounds(), r.footprint());
    }

    #[test]
    fn bounds_contain_their_edges() {
        let bounds = Bounds2D::from_origin_size(Point2::new(10.0, 20.0), 30.0, 40.0);
        assert!(bounds.contains(Point2::new(10.0, 20.0)));
        assert!(bounds.contains(Point2::new(40.0, 60.0)));
        assert!(bounds.contains(Point2::new(25.0, 30.0)));
        assert!(!bounds.contains(Point2::new(40.1, 30.0)));
        assert!(!bounds.contains(Point2::new(25.0, 19.9)));
        assert!(!Bounds2D::empty().contains(Point2::new(0.0, 0.0)));
    }

    #[test]
    fn pointer_mapping_inverts_render_transform() {
        let view = ViewTransform::new(Vector2::new(37.5, -12.25), 1.7);
        let origin = Point2::new(220.0, 64.0);
        for (sx, sy) in [(0.0, 0.0), (301.3, 99.9), (-45.0, 1024.0)] {
            let pointer = Point2::new(origin.x() + sx, origin.y() + sy);
            let model = map_pointer_to_model(pointer, origin, &view);
            let back = view.model_to_screen(model);
            assert!((back.x() - sx).abs() < 1e-9);
            assert!((back.y() - sy).abs() < 1e-9);
        }
    }

    #[test]
    fn rotation_accepts_only_quarter_turns() {
        assert_eq!(Rotation::from_degrees(0.0), Some(Rotation::Deg0));
        assert_eq!(Rotation::from_degrees(450.0), Some(Rotation::Deg90));
        assert_eq!(Rotation::from_degrees(-90.0), Some(Rotation::Deg270));
        assert_eq!(Rotation::from_degrees(45.0), None);
        assert_eq!(Rotation::Deg270.rotated_cw(), Rotation::Deg0);

        let parsed: Rotation = serde_json::from_str("180").expect("parse rotation");
        assert_eq!(parsed, Rotation::Deg180);
        assert!(serde_json::from_str::<Rotation>("30").is_err());
        assert_eq!(serde_json::to_string(&Rotation::Deg90).unwrap(), "90");
    }

    #[test]
    fn door_projection_follows_room_size() {
        let mut r = room("r", RoomKind::Bedroom, 50.0, 50.0, 120.0, 80.0);
        let mut door = Door::new(DoorId::new("d"));
        let top = door.local_rect(&r);
        assert_eq!(top.min(), Point2::new(10.0, -WALL_THICKNESS / 2.0));
        assert_eq!(top.width(), 30.0);

        door.wall = Wall::Right;
        r.width = 200.0;
        let right = door.local_rect(&r);
        assert_eq!(right.min().x(), 200.0 - WALL_THICKNESS / 2.0);
        assert_eq!(right.height(), 30.0);

        assert!(door.fits(&r));
        door.offset = 60.0;
        assert!(!door.fits(&r));
    }

    #[test]
    fn to_local_undoes_rotation() {
        let mut r = room("r", RoomKind::Living, 0.0, 0.0, 100.0, 40.0);
        r.rotation = Rotation::Deg90;
        // 旋转 90° 后局部左上角 (0,0) 位于模型坐标 (70,-30)。
        let local = r.to_local(Point2::new(70.0, -30.0));
        assert!(local.x().abs() < 1e-9);
        assert!(local.y().abs() < 1e-9);
    }

    #[test]
    fn plan_rejects_duplicates_and_generates_fresh_ids() {
        let mut plan = FloorPlan::empty();
        plan.insert_room(room("room-1", RoomKind::Bedroom, 0.0, 0.0, 10.0, 10.0))
            .unwrap();
        let err = plan
            .insert_room(room("room-1", RoomKind::Bedroom, 0.0, 0.0, 10.0, 10.0))
            .unwrap_err();
        assert_eq!(err, PlanError::DuplicateRoom(RoomId::new("room-1")));
        assert_eq!(plan.fresh_room_id(), RoomId::new("room-2"));
        assert_eq!(plan.fresh_plumbing_id(), PlumbingId::new("plumbing-1"));
        assert!(plan.check_integrity().is_ok());
    }

    #[test]
    fn validation_reports_overlaps_and_plumbing() {
        let mut plan = FloorPlan::empty();
        plan.insert_room(room("a", RoomKind::Bedroom, 0.0, 0.0, 100.0, 100.0))
            .unwrap();
        plan.insert_room(room("b", RoomKind::Kitchen, 50.0, 50.0, 100.0, 100.0))
            .unwrap();
        plan.insert_room(room("c", RoomKind::Storage, 500.0, 500.0, 20.0, 20.0))
            .unwrap();
        plan.insert_plumbing_point(point("p", 1000.0, 1000.0)).unwrap();

        let issues = validate_plan(&plan);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].overlapping, vec![RoomId::new("b")]);
        assert!(!issues[0].plumbing_out_of_range);
        assert!(issues[1].plumbing_out_of_range);
    }

    #[test]
    fn units_are_formatted_in_feet() {
        assert_eq!(format_feet(125.0), "12.5'");
        assert_eq!(format_dimensions(120.0, 60.0), "12.0' x 6.0'");
        assert_eq!(format_area(120.0, 120.0), "144.0 sqft");
    }
}
