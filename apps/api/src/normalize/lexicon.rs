//! Word lists behind `LexiconTagger`. All entries are lower-case.

/// Common given names. A capitalised match starts a person span.
pub const GIVEN_NAMES: &[&str] = &[
    "aaron", "abdul", "abhishek", "adam", "aditi", "aditya", "ahmed", "aisha", "akash",
    "alex", "alexander", "alice", "amanda", "amit", "amy", "ana", "andrea", "andrew",
    "angela", "anil", "anita", "anjali", "ankit", "anna", "anthony", "arjun", "ashley",
    "benjamin", "brian", "carlos", "carol", "charles", "chen", "chris", "christopher",
    "daniel", "david", "deepak", "divya", "emily", "emma", "eric", "fatima", "gaurav",
    "george", "hannah", "harish", "hui", "ivan", "jacob", "james", "jane", "jason",
    "jennifer", "jessica", "john", "jose", "joseph", "joshua", "juan", "karan",
    "karen", "kavya", "kevin", "kumar", "laura", "li", "linda", "lisa", "luis",
    "manish", "maria", "mark", "mary", "matthew", "megan", "mei", "michael", "michelle",
    "mohammed", "muhammad", "nancy", "neha", "nikhil", "nisha", "olivia", "omar",
    "pooja", "prakash", "priya", "rahul", "raj", "rajesh", "ravi", "rebecca", "richard",
    "robert", "rohan", "rohit", "sachin", "sakshi", "sam", "sandeep", "sarah", "sneha",
    "sophia", "steven", "sunil", "suresh", "thomas", "vikram", "vishal", "wei",
    "william", "yan", "yusuf",
];

/// Countries, states and large cities that appear in resume headers.
pub const PLACES: &[&str] = &[
    "afghanistan", "amsterdam", "argentina", "atlanta", "australia", "austin",
    "austria", "bangalore", "bangladesh", "bengaluru", "berlin", "bhopal", "boston",
    "brazil", "california", "canada", "chandigarh", "chennai", "chicago", "china",
    "colorado", "coimbatore", "delhi", "denmark", "dubai", "egypt", "england",
    "florida", "france", "germany", "ghana", "greece", "gujarat", "gurgaon", "gurugram",
    "hyderabad", "illinois", "india", "indonesia", "indore", "ireland", "israel",
    "italy", "jaipur", "japan", "karnataka", "kenya", "kerala", "kochi", "kolkata",
    "lagos", "london", "lucknow", "madrid", "maharashtra", "malaysia", "massachusetts",
    "melbourne", "mexico", "michigan", "mumbai", "nagpur", "nairobi", "nepal",
    "netherlands", "nigeria", "noida", "norway", "ohio", "ontario", "pakistan", "paris",
    "philippines", "poland", "portugal", "pune", "punjab", "qatar", "rajasthan",
    "russia", "seattle", "singapore", "spain", "surat", "sweden", "switzerland",
    "sydney", "tamil", "telangana", "texas", "tokyo", "toronto", "uae", "uk", "usa",
    "vancouver", "vietnam", "virginia", "washington",
];

/// Multi-token place names, space separated.
pub const MULTI_WORD_PLACES: &[&str] = &[
    "hong kong", "los angeles", "new delhi", "new jersey", "new york", "new zealand",
    "north carolina", "san diego", "san francisco", "san jose", "saudi arabia",
    "south africa", "sri lanka", "tamil nadu", "united kingdom", "united states",
    "uttar pradesh", "west bengal",
];

/// Verbs tagged in every form, including the base form.
pub const VERB_BASES: &[&str] = &[
    "accelerate", "achieve", "administer", "analyze", "architect", "assist", "automate",
    "collaborate", "communicate", "conduct", "coordinate", "create", "debug", "define",
    "deliver", "demonstrate", "deploy", "develop", "enhance", "ensure", "establish",
    "evaluate", "execute", "facilitate", "generate", "identify", "implement", "improve",
    "increase", "integrate", "maintain", "migrate", "mentor", "monitor", "negotiate",
    "optimize", "organize", "oversee", "participate", "perform", "prepare", "reduce",
    "refactor", "resolve", "streamline", "train", "troubleshoot", "utilize", "write",
];

/// Verbs that double as nouns; only their inflected forms are tagged.
pub const NOUN_LIKE_VERBS: &[&str] = &[
    "build", "code", "design", "document", "handle", "lead", "manage", "model",
    "process", "report", "research", "review", "support", "test", "use", "work",
];

/// Irregular and consonant-doubling inflections.
pub const IRREGULAR_FORMS: &[&str] = &[
    "am", "are", "be", "became", "been", "began", "begun", "being", "bought", "brought",
    "built", "chose", "committed", "committing", "controlled", "controlling", "did",
    "done", "drove", "found", "gave", "got", "had", "has", "have", "held", "is", "kept",
    "led", "made", "met", "oversaw", "planned", "planning", "ran", "running", "sent",
    "set", "shipped", "shipping", "spent", "taught", "thought", "took", "was", "were",
    "won", "wrote", "written",
];
