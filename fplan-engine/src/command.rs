use std::collections::HashMap;

use fplan_core::geometry::Point2;
use fplan_core::plan::{DoorId, PlumbingId, RoomId, RoomKind, Wall};

use crate::scene::{DoorUpdate, RoomUpdate, Scene};

#[derive(Debug, Clone, PartialEq)]
pub struct CommandRequest {
    pub name: String,
    pub args: Vec<String>,
}

impl CommandRequest {
    /// 按空白切分一行脚本，首个词为命令名。空行返回 `None`。
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let name = words.next()?.to_string();
        Some(Self {
            name,
            args: words.map(str::to_string).collect(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct CommandResponse {
    pub success: bool,
    pub message: Option<String>,
}

impl CommandResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

pub trait CommandHandler: Send + Sync {
    fn name(&self) -> &'static str;
    fn usage(&self) -> &'static str;
    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse;
}

pub struct CommandContext<'a> {
    pub scene: &'a mut Scene,
}

pub struct CommandBus {
    handlers: HashMap<&'static str, Box<dyn CommandHandler>>,
}

impl CommandBus {
    pub fn new() -> Self {
        let mut bus = Self {
            handlers: HashMap::new(),
        };
        bus.register(AddRoomCommand);
        bus.register(DeleteRoomCommand);
        bus.register(RotateRoomCommand);
        bus.register(MoveRoomCommand);
        bus.register(ResizeRoomCommand);
        bus.register(RenameRoomCommand);
        bus.register(SetRoomTypeCommand);
        bus.register(AddDoorCommand);
        bus.register(UpdateDoorCommand);
        bus.register(DeleteDoorCommand);
        bus.register(AddPlumbingCommand);
        bus.register(MovePlumbingCommand);
        bus.register(DeletePlumbingCommand);
        bus.register(UndoCommand);
        bus.register(RedoCommand);
        bus.register(ClearSelectionCommand);
        bus
    }

    pub fn register<H: CommandHandler + 'static>(&mut self, handler: H) {
        self.handlers.insert(handler.name(), Box::new(handler));
    }

    pub fn dispatch(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        if let Some(handler) = self.handlers.get(request.name.as_str()) {
            handler.execute(request, context)
        } else {
            CommandResponse::err(format!("未知命令: {}", request.name))
        }
    }

    pub fn available_commands(&self) -> impl Iterator<Item = &&'static str> {
        self.handlers.keys()
    }

    pub fn usage(&self, name: &str) -> Option<&'static str> {
        self.handlers.get(name).map(|handler| handler.usage())
    }
}

impl Default for CommandBus {
    fn default() -> Self {
        Self::new()
    }
}

fn arg<'r>(
    request: &'r CommandRequest,
    index: usize,
    usage: &str,
) -> Result<&'r str, CommandResponse> {
    request
        .args
        .get(index)
        .map(String::as_str)
        .ok_or_else(|| CommandResponse::err(format!("参数不足，用法: {usage}")))
}

fn number(request: &CommandRequest, index: usize, usage: &str) -> Result<f64, CommandResponse> {
    let raw = arg(request, index, usage)?;
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CommandResponse::err(format!("无法解析数值: {raw}"))),
    }
}

fn point(request: &CommandRequest, first: usize, usage: &str) -> Result<Point2, CommandResponse> {
    Ok(Point2::new(
        number(request, first, usage)?,
        number(request, first + 1, usage)?,
    ))
}

macro_rules! try_args {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(response) => return response,
        }
    };
}

struct AddRoomCommand;

impl CommandHandler for AddRoomCommand {
    fn name(&self) -> &'static str {
        "add_room"
    }

    fn usage(&self) -> &'static str {
        "add_room <bedroom|toilet|kitchen|living|balcony|storage|corridor>"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let raw = try_args!(arg(request, 0, self.usage()));
        let Some(kind) = RoomKind::parse(raw) else {
            return CommandResponse::err(format!("未知房间类型: {raw}"));
        };
        match context.scene.add_room(kind) {
            Ok(id) => CommandResponse::ok(format!("已新建房间 {id}")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct DeleteRoomCommand;

impl CommandHandler for DeleteRoomCommand {
    fn name(&self) -> &'static str {
        "delete_room"
    }

    fn usage(&self) -> &'static str {
        "delete_room <room-id>"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let id = RoomId::new(try_args!(arg(request, 0, self.usage())));
        match context.scene.delete_room(&id) {
            Ok(room) => CommandResponse::ok(format!("已删除房间 {} ({})", room.id, room.label)),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct RotateRoomCommand;

impl CommandHandler for RotateRoomCommand {
    fn name(&self) -> &'static str {
        "rotate_room"
    }

    fn usage(&self) -> &'static str {
        "rotate_room <room-id>"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let id = RoomId::new(try_args!(arg(request, 0, self.usage())));
        match context.scene.rotate_room(&id) {
            Ok(rotation) => {
                CommandResponse::ok(format!("房间 {id} 已旋转至 {}°", rotation.degrees()))
            }
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct MoveRoomCommand;

impl CommandHandler for MoveRoomCommand {
    fn name(&self) -> &'static str {
        "move_room"
    }

    fn usage(&self) -> &'static str {
        "move_room <room-id> <x> <y>"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let id = RoomId::new(try_args!(arg(request, 0, self.usage())));
        let origin = try_args!(point(request, 1, self.usage()));
        let update = RoomUpdate {
            origin: Some(origin),
            ..RoomUpdate::default()
        };
        match context.scene.update_room(&id, update) {
            Ok(()) => CommandResponse::ok(format!(
                "房间 {id} 已移动到 ({}, {})",
                origin.x(),
                origin.y()
            )),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct ResizeRoomCommand;

impl CommandHandler for ResizeRoomCommand {
    fn name(&self) -> &'static str {
        "resize_room"
    }

    fn usage(&self) -> &'static str {
        "resize_room <room-id> <width> <height>"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let id = RoomId::new(try_args!(arg(request, 0, self.usage())));
        let width = try_args!(number(request, 1, self.usage()));
        let height = try_args!(number(request, 2, self.usage()));
        let update = RoomUpdate {
            size: Some((width, height)),
            ..RoomUpdate::default()
        };
        match context.scene.update_room(&id, update) {
            Ok(()) => CommandResponse::ok(format!("房间 {id} 尺寸已设为 {width}x{height}")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct RenameRoomCommand;

impl CommandHandler for RenameRoomCommand {
    fn name(&self) -> &'static str {
        "rename_room"
    }

    fn usage(&self) -> &'static str {
        "rename_room <room-id> <label...>"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let id = RoomId::new(try_args!(arg(request, 0, self.usage())));
        let label = request.args[1..].join(" ");
        if label.is_empty() {
            return CommandResponse::err(format!("参数不足，用法: {}", self.usage()));
        }
        let update = RoomUpdate {
            label: Some(label.clone()),
            ..RoomUpdate::default()
        };
        match context.scene.update_room(&id, update) {
            Ok(()) => CommandResponse::ok(format!("房间 {id} 已重命名为 {label}")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct AddDoorCommand;

impl CommandHandler for AddDoorCommand {
    fn name(&self) -> &'static str {
        "add_door"
    }

    fn usage(&self) -> &'static str {
        "add_door <room-id>"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let room = RoomId::new(try_args!(arg(request, 0, self.usage())));
        match context.scene.add_door(&room) {
            Ok(door) => CommandResponse::ok(format!("已在房间 {room} 上新建门 {door}")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct SetRoomTypeCommand;

impl CommandHandler for SetRoomTypeCommand {
    fn name(&self) -> &'static str {
        "set_room_type"
    }

    fn usage(&self) -> &'static str {
        "set_room_type <room-id> <bedroom|toilet|kitchen|living|balcony|storage|corridor>"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let id = RoomId::new(try_args!(arg(request, 0, self.usage())));
        let raw = try_args!(arg(request, 1, self.usage()));
        let Some(kind) = RoomKind::parse(raw) else {
            return CommandResponse::err(format!("未知房间类型: {raw}"));
        };
        let update = RoomUpdate {
            kind: Some(kind),
            ..RoomUpdate::default()
        };
        match context.scene.update_room(&id, update) {
            Ok(()) => CommandResponse::ok(format!("房间 {id} 类型已设为 {kind}")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct UpdateDoorCommand;

impl CommandHandler for UpdateDoorCommand {
    fn name(&self) -> &'static str {
        "update_door"
    }

    fn usage(&self) -> &'static str {
        "update_door <room-id> <door-id> <top|right|bottom|left> <offset> <width>"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let room = RoomId::new(try_args!(arg(request, 0, self.usage())));
        let door = DoorId::new(try_args!(arg(request, 1, self.usage())));
        let raw_wall = try_args!(arg(request, 2, self.usage()));
        let Some(wall) = Wall::parse(raw_wall) else {
            return CommandResponse::err(format!("未知墙体: {raw_wall}"));
        };
        let offset = try_args!(number(request, 3, self.usage()));
        let width = try_args!(number(request, 4, self.usage()));
        let update = DoorUpdate {
            wall: Some(wall),
            offset: Some(offset),
            width: Some(width),
        };
        match context.scene.update_door(&room, &door, update) {
            Ok(()) => CommandResponse::ok(format!(
                "门 {door} 已更新: {} 偏移={offset} 宽度={width}",
                wall.name()
            )),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct DeleteDoorCommand;

impl CommandHandler for DeleteDoorCommand {
    fn name(&self) -> &'static str {
        "delete_door"
    }

    fn usage(&self) -> &'static str {
        "delete_door <room-id> <door-id>"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let room = RoomId::new(try_args!(arg(request, 0, self.usage())));
        let door = DoorId::new(try_args!(arg(request, 1, self.usage())));
        match context.scene.delete_door(&room, &door) {
            Ok(()) => CommandResponse::ok(format!("已删除房间 {room} 的门 {door}")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct AddPlumbingCommand;

impl CommandHandler for AddPlumbingCommand {
    fn name(&self) -> &'static str {
        "add_plumbing"
    }

    fn usage(&self) -> &'static str {
        "add_plumbing <x> <y>"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let position = try_args!(point(request, 0, self.usage()));
        match context.scene.add_plumbing_point(position) {
            Ok(id) => CommandResponse::ok(format!("已新建给排水点 {id}")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct MovePlumbingCommand;

impl CommandHandler for MovePlumbingCommand {
    fn name(&self) -> &'static str {
        "move_plumbing"
    }

    fn usage(&self) -> &'static str {
        "move_plumbing <plumbing-id> <x> <y>"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let id = PlumbingId::new(try_args!(arg(request, 0, self.usage())));
        let position = try_args!(point(request, 1, self.usage()));
        match context.scene.set_plumbing_position(&id, position) {
            Ok(()) => CommandResponse::ok(format!("给排水点 {id} 已移动")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct DeletePlumbingCommand;

impl CommandHandler for DeletePlumbingCommand {
    fn name(&self) -> &'static str {
        "delete_plumbing"
    }

    fn usage(&self) -> &'static str {
        "delete_plumbing <plumbing-id>"
    }

    fn execute(
        &self,
        request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        let id = PlumbingId::new(try_args!(arg(request, 0, self.usage())));
        match context.scene.delete_plumbing_point(&id) {
            Ok(()) => CommandResponse::ok(format!("已删除给排水点 {id}")),
            Err(err) => CommandResponse::err(err.to_string()),
        }
    }
}

struct UndoCommand;

impl CommandHandler for UndoCommand {
    fn name(&self) -> &'static str {
        "undo"
    }

    fn usage(&self) -> &'static str {
        "undo"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        if context.scene.undo() {
            CommandResponse::ok("已撤销")
        } else {
            CommandResponse::err("没有可撤销的操作")
        }
    }
}

struct RedoCommand;

impl CommandHandler for RedoCommand {
    fn name(&self) -> &'static str {
        "redo"
    }

    fn usage(&self) -> &'static str {
        "redo"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        if context.scene.redo() {
            CommandResponse::ok("已重做")
        } else {
            CommandResponse::err("没有可重做的操作")
        }
    }
}

struct ClearSelectionCommand;

impl CommandHandler for ClearSelectionCommand {
    fn name(&self) -> &'static str {
        "clear_selection"
    }

    fn usage(&self) -> &'static str {
        "clear_selection"
    }

    fn execute(
        &self,
        _request: &CommandRequest,
        context: &mut CommandContext<'_>,
    ) -> CommandResponse {
        context.scene.clear_selection();
        CommandResponse::ok("选中集已清空")
    }
}
