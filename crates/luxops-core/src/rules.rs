/// Venue layout rules: shared by the scenario prompt and the MCP instructions.
pub const RULES: &str = "\
1. The canvas is 800 units wide and 600 units tall. Every item's centre (x, y) must lie inside \
0-800 x 0-600. Items outside are clamped to the edge on import.\n\
2. Item types are a closed set: TABLE_ROUND, TABLE_RECT, DANCE_FLOOR, ENTRANCE. Anything else is \
dropped on import.\n\
3. Egress clearance: the centres of any two items must be at least 80 units apart. A pair closer \
than that is a compliance violation and both items are flagged.\n\
4. Tables carry a guest count (`guests`) and should have a staff member assigned (`assignedStaff`). \
Unstaffed tables show as cold spots on the staffing heatmap.\n\
5. Rotation is in degrees and only affects rendering. It never changes clearance.\n\
6. Item ids are unique within a plan. Generated layouts replace the whole plan; they are never merged \
into an existing one.\n\
7. Tasks form the run of show. `time` is \"HH:MM\" (24h), `status` is PENDING, COMPLETED or LATE, \
and `role` names the staff position responsible, not a person.\n\
\n\
## Workflow\n\
1. `list_plans` to see stored events, `get_plan` to read one.\n\
2. Move furniture with `move_items` (absolute canvas coordinates) or `drag_item` (a pointer path in \
screen coordinates plus the canvas transform).\n\
3. Run `check_compliance` after every layout change and fix flagged pairs before reporting success.\n\
4. Use `get_heatmap` to find tables without assigned staff.\n\
5. `generate_scenario` replaces the whole timeline and layout from a prompt; call it only when the \
user asks for a new plan.";
