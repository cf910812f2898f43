// Prompt templates for every gateway operation. Placeholders in `{braces}`
// are substituted with `str::replace` before sending.

/// Job search over live web results. Replace: {location}, {role}, {page}
pub const SEARCH_JOBS_PROMPT_TEMPLATE: &str = r#"请在Google上搜索 "{location}" 地区关于 "{role}" 的最新招聘职位信息。
这是第 {page} 页的搜索请求。请尝试寻找与之前页面不同的、更多样化的职位。

请尽量筛选出 9 个真实且相关的职位 (来源可以是各大招聘网站、公司官网等全网数据)。

请严格按照以下JSON数组格式提取并返回信息 (不要包含Markdown代码块标记，直接返回JSON字符串):
[
  {
    "id": "unique_id_string",
    "title": "职位名称",
    "company": "公司名称",
    "location": "工作地点",
    "salaryRange": "薪资范围 (如未提及请填'面议')",
    "tags": ["标签1", "标签2"],
    "description": "职位描述摘要 (50-100字)",
    "requirements": ["要求1", "要求2", "要求3"],
    "applyUrl": "职位详情或申请页面的URL",
    "postedDate": "发布时间 (例如: '3天前', '2小时前', '2023-10-25', '刚刚')"
  }
]"#;

/// Placeholder id the search prompt shows the model; replaced on receipt.
pub const PLACEHOLDER_JOB_ID: &str = "unique_id_string";

/// Profile tailored to a listing. Replace: {title}, {company}, {description}, {requirements}
pub const PROFILE_FOR_JOB_PROMPT_TEMPLATE: &str = r#"请根据以下职位描述，生成一个虚构但高度匹配的求职者画像（JSON格式）。

目标职位:
职位: {title}
公司: {company}
描述: {description}
要求: {requirements}

请返回一个JSON对象，包含以下字段 (使用中文):
- fullName: 一个真实的中文姓名
- education: 教育背景 (学校+专业，例如：xx大学 计算机科学与技术 本科)
- skills: 核心技能 (逗号分隔，匹配职位要求)
- experience: 工作经验摘要 (100字左右，以第一人称描述，突出与该职位匹配的成就和经验)

只返回JSON字符串，不要Markdown标记。"#;

pub const GENERIC_PROFILE_PROMPT: &str = r#"请生成一个通用的、优秀的求职者画像（JSON格式），假设求职者是一名有3-5年经验的专业人士（可以是软件工程师、产品经理或市场营销等通用热门岗位）。

请返回一个JSON对象，包含以下字段 (使用中文):
- fullName: 一个真实的中文姓名
- education: 教育背景 (学校+专业)
- skills: 核心技能 (逗号分隔)
- experience: 工作经验摘要 (100字左右，以第一人称描述)

只返回JSON字符串，不要Markdown标记。"#;

/// Replace: {title}, {company}, {description}, {requirements}
pub const RESUME_JOB_CONTEXT_TEMPLATE: &str = r#"目标职位:
职位名称: {title}
公司: {company}
职位描述: {description}
职位要求: {requirements}

任务:
根据求职者的资料，为该目标职位量身定制一份专业的简历内容。"#;

pub const RESUME_GENERIC_CONTEXT: &str = r#"任务:
根据求职者的资料，整理一份专业的通用简历。"#;

/// Structured résumé. Replace: {context}, {full_name}, {experience}, {skills},
/// {education}, {city}
pub const RESUME_PROMPT_TEMPLATE: &str = r#"请扮演一位资深的职业顾问和简历撰写专家。

{context}

求职者资料:
姓名: {full_name}
工作经验摘要: {experience}
技能: {skills}
教育背景: {education}

请严格返回以下JSON格式 (不要Markdown标记):
{
  "fullName": "{full_name}",
  "contactInfo": "电话: 138-xxxx-xxxx | 邮箱: example@email.com | 所在地: {city}",
  "summary": "个人优势总结（100字以内）",
  "skills": ["技能1", "技能2", "技能3", "技能4", "技能5"],
  "experience": [
    {
      "role": "职位名称",
      "company": "公司名称",
      "period": "20xx.xx - 20xx.xx",
      "details": ["工作内容描述1 (使用STAR法则)", "工作内容描述2", "工作内容描述3"]
    }
  ],
  "education": [
    {
      "degree": "学位/专业",
      "school": "学校名称",
      "year": "毕业年份"
    }
  ]
}"#;

/// City shown in the contact line when no listing is selected.
pub const DEFAULT_CITY: &str = "城市";

/// Freeform rewrite of the editor text. Replace: {instruction}, {content}
pub const REWRITE_PROMPT_TEMPLATE: &str = r#"你是一个Markdown简历编辑器助手。
用户希望根据以下指令修改当前的简历 Markdown 内容。

指令: "{instruction}"

当前的 Markdown 内容:
{content}

要求:
1. 仅返回修改后的 Markdown 内容，不要包含 ```markdown 标记。
2. 保持 Markdown 格式的完整性。
3. 如果指令是关于润色语言，请使其更专业、更有说服力。"#;
