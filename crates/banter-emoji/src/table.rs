//! Built-in shortcode table.
//!
//! Shortcodes follow the common Slack/Discord/GitHub conventions, plus a
//! handful of dev-culture and solidarity codes the community uses. Custom
//! emotes from the remote source can shadow any entry here.

/// (code, glyph, alt)
pub(crate) static STANDARD_EMOJIS: &[(&str, &str, &str)] = &[
    // Smileys & people
    ("smile", "😊", "smiling face"),
    ("grin", "😀", "grinning face"),
    ("joy", "😂", "face with tears of joy"),
    ("rofl", "🤣", "rolling on the floor laughing"),
    ("wink", "😉", "winking face"),
    ("blush", "😊", "blushing face"),
    ("heart_eyes", "😍", "heart eyes"),
    ("thinking", "🤔", "thinking face"),
    ("neutral_face", "😐", "neutral face"),
    ("unamused", "😒", "unamused"),
    ("rolling_eyes", "🙄", "rolling eyes"),
    ("grimacing", "😬", "grimacing"),
    ("relieved", "😌", "relieved"),
    ("pensive", "😔", "pensive"),
    ("sleepy", "😪", "sleepy"),
    ("sleeping", "😴", "sleeping"),
    ("nerd", "🤓", "nerd face"),
    ("sunglasses", "😎", "sunglasses"),
    ("clown", "🤡", "clown"),
    ("partying", "🥳", "partying"),
    ("smirk", "😏", "smirk"),
    ("disappointed", "😞", "disappointed"),
    ("worried", "😟", "worried"),
    ("angry", "😠", "angry"),
    ("rage", "😡", "rage"),
    ("cry", "😢", "crying"),
    ("sob", "😭", "sobbing"),
    ("scream", "😱", "screaming"),
    ("flushed", "😳", "flushed"),
    ("exploding_head", "🤯", "exploding head"),
    ("shush", "🤫", "shushing"),
    ("zipper_mouth", "🤐", "zipper mouth"),
    ("money_mouth", "🤑", "money mouth"),
    ("hugs", "🤗", "hugging"),
    ("shrug", "🤷", "shrug"),
    ("salute", "🫡", "salute"),
    // Gestures
    ("thumbsup", "👍", "thumbs up"),
    ("+1", "👍", "thumbs up"),
    ("thumbsdown", "👎", "thumbs down"),
    ("-1", "👎", "thumbs down"),
    ("ok_hand", "👌", "ok hand"),
    ("v", "✌️", "peace"),
    ("crossed_fingers", "🤞", "crossed fingers"),
    ("metal", "🤘", "metal"),
    ("point_left", "👈", "point left"),
    ("point_right", "👉", "point right"),
    ("point_up", "👆", "point up"),
    ("point_down", "👇", "point down"),
    ("raised_hand", "✋", "raised hand"),
    ("wave", "👋", "wave"),
    ("clap", "👏", "clap"),
    ("raised_hands", "🙌", "raised hands"),
    ("handshake", "🤝", "handshake"),
    ("pray", "🙏", "pray"),
    ("muscle", "💪", "muscle"),
    ("fist", "✊", "fist"),
    ("punch", "👊", "punch"),
    // Hearts & symbols
    ("heart", "❤️", "heart"),
    ("yellow_heart", "💛", "yellow heart"),
    ("green_heart", "💚", "green heart"),
    ("blue_heart", "💙", "blue heart"),
    ("purple_heart", "💜", "purple heart"),
    ("black_heart", "🖤", "black heart"),
    ("broken_heart", "💔", "broken heart"),
    ("fire", "🔥", "fire"),
    ("sparkles", "✨", "sparkles"),
    ("star", "⭐", "star"),
    ("zap", "⚡", "zap"),
    ("boom", "💥", "boom"),
    ("100", "💯", "hundred"),
    ("check", "✅", "check"),
    ("x", "❌", "x"),
    ("question", "❓", "question"),
    ("exclamation", "❗", "exclamation"),
    ("warning", "⚠️", "warning"),
    // Objects & tech
    ("eyes", "👀", "eyes"),
    ("brain", "🧠", "brain"),
    ("skull", "💀", "skull"),
    ("poop", "💩", "poop"),
    ("robot", "🤖", "robot"),
    ("ghost", "👻", "ghost"),
    ("computer", "💻", "computer"),
    ("keyboard", "⌨️", "keyboard"),
    ("phone", "📱", "phone"),
    ("bug", "🐛", "bug"),
    ("rocket", "🚀", "rocket"),
    ("gear", "⚙️", "gear"),
    ("wrench", "🔧", "wrench"),
    ("hammer", "🔨", "hammer"),
    ("lock", "🔒", "lock"),
    ("key", "🔑", "key"),
    ("bulb", "💡", "light bulb"),
    ("mag", "🔍", "magnifying glass"),
    ("link", "🔗", "link"),
    ("memo", "📝", "memo"),
    ("book", "📖", "book"),
    ("calendar", "📅", "calendar"),
    ("chart", "📈", "chart"),
    ("chart_down", "📉", "chart down"),
    ("money", "💰", "money"),
    ("dollar", "💵", "dollar"),
    // Food & drink
    ("coffee", "☕", "coffee"),
    ("tea", "🍵", "tea"),
    ("beer", "🍺", "beer"),
    ("beers", "🍻", "beers"),
    ("wine", "🍷", "wine"),
    ("pizza", "🍕", "pizza"),
    ("burger", "🍔", "burger"),
    ("taco", "🌮", "taco"),
    ("cake", "🎂", "cake"),
    ("cookie", "🍪", "cookie"),
    ("popcorn", "🍿", "popcorn"),
    // Nature & animals
    ("sun", "☀️", "sun"),
    ("moon", "🌙", "moon"),
    ("rainbow", "🌈", "rainbow"),
    ("tree", "🌳", "tree"),
    ("dog", "🐕", "dog"),
    ("cat", "🐈", "cat"),
    ("unicorn", "🦄", "unicorn"),
    ("snake", "🐍", "snake"),
    ("turtle", "🐢", "turtle"),
    ("crab", "🦀", "crab"),
    ("octopus", "🐙", "octopus"),
    // Dev & work culture
    ("shipit", "🚀", "ship it"),
    ("lgtm", "👍", "looks good to me"),
    ("wfh", "🏠", "work from home"),
    ("meeting", "📅", "meeting"),
    ("standup", "🧍", "standup"),
    ("deploy", "🚀", "deploy"),
    ("hotfix", "🔥", "hotfix"),
    ("revert", "⏪", "revert"),
    ("merge", "🔀", "merge"),
    ("pr", "📝", "pull request"),
    ("review", "👀", "review"),
    ("approved", "✅", "approved"),
    ("rejected", "❌", "rejected"),
    ("wip", "🚧", "work in progress"),
    ("todo", "📋", "todo"),
    ("done", "✅", "done"),
    ("blocked", "🚫", "blocked"),
    // Solidarity
    ("solidarity", "✊", "solidarity"),
    ("union", "🤝", "union"),
    ("fair-go", "⚖️", "fair go"),
    ("strike", "✊", "strike"),
    ("workers", "👷", "workers"),
];
